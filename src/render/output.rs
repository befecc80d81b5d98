use crate::config::model::{TextBlockDef, TextConfigDef};
use crate::foundation::error::ThumbResult;
use crate::foundation::names::slugify;
use crate::render::composite::Canvas;
use crate::render::compositor::{RenderReport, Thumbnail, ThumbnailRequest};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Output directory, relative to the project root, used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output/set_thumbnail";

/// `"<p1> vs <p2> [round] [event title] [event number]"`, slugified.
///
/// Disabled or empty blocks contribute nothing.
pub fn thumbnail_slug(req: &ThumbnailRequest, text: &TextConfigDef) -> String {
    let mut parts = vec![req.player1.clone(), "vs".to_owned(), req.player2.clone()];
    for block in [&text.round_title, &text.event_title, &text.event_number] {
        let part = block.as_ref().map(TextBlockDef::enabled_text).unwrap_or_default();
        if !part.is_empty() {
            parts.push(part);
        }
    }
    slugify(&parts.join(" "))
}

/// Save the canvas as an RGB PNG, creating parent directories.
pub fn write_png(canvas: &Canvas, path: &Path) -> ThumbResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    canvas
        .to_rgb_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// JSON sidecar describing a rendered thumbnail.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ThumbnailMetadata<'a> {
    pub slug: &'a str,
    pub image: &'a Path,
    pub request: &'a ThumbnailRequest,
    pub report: &'a RenderReport,
    /// Seconds since the unix epoch.
    pub generated_at: u64,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Files written for one thumbnail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedThumbnail {
    pub image: PathBuf,
    pub metadata: Option<PathBuf>,
}

/// Write `<dir>/<slug>.png` and, when asked, `<dir>/<slug>.json`.
pub fn save_thumbnail(
    thumb: &Thumbnail,
    req: &ThumbnailRequest,
    dir: &Path,
    slug: &str,
    with_metadata: bool,
) -> ThumbResult<SavedThumbnail> {
    let image = dir.join(format!("{slug}.png"));
    write_png(&thumb.canvas, &image)?;
    tracing::info!(path = %image.display(), "wrote thumbnail");

    let metadata = if with_metadata {
        let path = dir.join(format!("{slug}.json"));
        let meta = ThumbnailMetadata {
            slug,
            image: &image,
            request: req,
            report: &thumb.report,
            generated_at: unix_now(),
        };
        let mut json = serde_json::to_string_pretty(&meta)
            .with_context(|| format!("serialize metadata for '{slug}'"))?;
        json.push('\n');
        std::fs::write(&path, json)
            .with_context(|| format!("write metadata '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "wrote metadata");
        Some(path)
    } else {
        None
    };
    Ok(SavedThumbnail { image, metadata })
}

#[cfg(test)]
#[path = "../../tests/unit/render/output.rs"]
mod tests;

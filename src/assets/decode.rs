use crate::foundation::error::{ThumbError, ThumbResult};
use anyhow::Context;
use image::RgbaImage;
use std::path::Path;

/// Decode an image file from disk into straight RGBA8.
pub fn load_rgba(path: &Path) -> ThumbResult<RgbaImage> {
    if !path.is_file() {
        return Err(ThumbError::asset_not_found(format!(
            "image file not found: '{}'",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let img = decode_rgba(&bytes).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img)
}

/// Decode in-memory PNG/JPEG bytes into straight RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Load a character sprite, flipped horizontally when `mirror` is set.
pub fn load_sprite(path: &Path, mirror: bool) -> ThumbResult<RgbaImage> {
    let mut img = load_rgba(path)?;
    if mirror {
        image::imageops::flip_horizontal_in_place(&mut img);
    }
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use crate::foundation::color::Rgba8;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::text::measure::{TextMeasure, VMetrics};
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One font file with a collection holding only that file's faces.
///
/// Files of the same family (a Regular and a Bold) register under one family name, so a shared
/// collection would let shaping match a face from another file.
struct FontFace {
    family: String,
    font_ctx: parley::FontContext,
}

/// Shapes text with Parley from font files on disk.
///
/// Fonts are read and registered once per path and then reused for every layout.
pub struct TextEngine {
    layout_ctx: parley::LayoutContext<TextBrush>,
    faces: HashMap<PathBuf, FontFace>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, path: &Path) -> ThumbResult<&mut FontFace> {
        if !self.faces.contains_key(path) {
            let face = load_face(path)?;
            tracing::debug!(path = %path.display(), family = %face.family, "registered font");
            self.faces.insert(path.to_path_buf(), face);
        }
        self.faces
            .get_mut(path)
            .ok_or_else(|| ThumbError::layout("font cache miss"))
    }

    /// Family name registered for the file at `path`.
    pub(crate) fn family(&mut self, path: &Path) -> ThumbResult<String> {
        Ok(self.face(path)?.family.clone())
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        font: &Path,
        size_px: u32,
        text: &str,
        brush: TextBrush,
    ) -> ThumbResult<parley::Layout<TextBrush>> {
        if size_px == 0 {
            return Err(ThumbError::layout("font size must be > 0"));
        }
        let family = self.family(font)?;
        let face = self
            .faces
            .get_mut(font)
            .ok_or_else(|| ThumbError::layout("font cache miss"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

fn load_face(path: &Path) -> ThumbResult<FontFace> {
    if !path.is_file() {
        return Err(ThumbError::config(format!(
            "font file does not exist: '{}'",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;

    let mut font_ctx = parley::FontContext::default();
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ThumbError::config(format!("no font families in '{}'", path.display())))?;
    let family = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ThumbError::config("registered font family has no name"))?
        .to_string();

    Ok(FontFace { family, font_ctx })
}

impl TextMeasure for TextEngine {
    fn text_width(&mut self, font: &Path, size_px: u32, text: &str) -> ThumbResult<i32> {
        if text.is_empty() {
            return Ok(0);
        }
        let layout = self.layout_line(font, size_px, text, TextBrush::default())?;
        let advance = layout
            .lines()
            .map(|l| l.metrics().advance)
            .fold(0.0f32, f32::max);
        Ok(advance.round() as i32)
    }

    fn metrics(&mut self, font: &Path, size_px: u32) -> ThumbResult<VMetrics> {
        let layout = self.layout_line(font, size_px, "Ag", TextBrush::default())?;
        let line = layout
            .lines()
            .next()
            .ok_or_else(|| ThumbError::layout("probe layout produced no lines"))?;
        let m = line.metrics();
        Ok(VMetrics {
            ascent: m.ascent.ceil() as i32,
            descent: m.descent.ceil() as i32,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;

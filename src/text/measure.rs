use crate::foundation::error::ThumbResult;
use std::path::Path;

/// Vertical font metrics at one pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct VMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: i32,
}

impl VMetrics {
    pub fn line_height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// Text measurement used by layout; painting is separate.
pub trait TextMeasure {
    /// Advance width of `text` set in `font` at `size_px`, in whole pixels.
    fn text_width(&mut self, font: &Path, size_px: u32, text: &str) -> ThumbResult<i32>;

    /// Ascent and descent of `font` at `size_px`.
    fn metrics(&mut self, font: &Path, size_px: u32) -> ThumbResult<VMetrics>;
}

/// Deterministic measurer for layout tests: every char advances `size / 2`.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FixedAdvance;

#[cfg(test)]
impl TextMeasure for FixedAdvance {
    fn text_width(&mut self, _font: &Path, size_px: u32, text: &str) -> ThumbResult<i32> {
        Ok((text.chars().count() as u32 * size_px / 2) as i32)
    }

    fn metrics(&mut self, _font: &Path, size_px: u32) -> ThumbResult<VMetrics> {
        let ascent = (size_px * 8 / 10) as i32;
        Ok(VMetrics {
            ascent,
            descent: size_px as i32 - ascent,
        })
    }
}

use crate::foundation::core::round_half_even;
use crate::foundation::error::ThumbResult;
use crate::text::measure::{TextMeasure, VMetrics};
use std::path::PathBuf;

/// Placeholder replaced by the event number token inside segment text.
pub const EVENT_NUMBER_TOKEN: &str = "{event_number}";

/// The last `#`-prefixed token of `text` (`"Genesis #54"` -> `"#54"`).
///
/// Within one whitespace-delimited word the match starts at the first `#` that has at least one
/// character after it and runs to the end of the word.
pub fn event_number_token(text: &str) -> Option<&str> {
    text.split_whitespace()
        .filter_map(|word| {
            let i = word.find('#')?;
            (i + 1 < word.len()).then(|| &word[i..])
        })
        .last()
}

/// One styled run of a segmented block, already resolved to canvas units.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentSpec {
    pub text: String,
    pub size_scale: f64,
    pub font: PathBuf,
    /// Extra horizontal advance after the segment, in canvas pixels.
    pub x_adjust: i32,
}

/// A segment measured at a concrete size.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredSegment {
    pub text: String,
    pub font: PathBuf,
    pub size: u32,
    pub width: i32,
    pub x_adjust: i32,
    pub metrics: VMetrics,
}

/// All segments measured at one trial base size.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRow {
    pub base_size: u32,
    /// Sum of segment widths plus their adjustments.
    pub total_width: i32,
    pub max_ascent: i32,
    pub max_descent: i32,
    pub segments: Vec<MeasuredSegment>,
}

impl SegmentRow {
    pub fn height(&self) -> i32 {
        self.max_ascent + self.max_descent
    }
}

/// Size of one segment for a trial base size.
pub fn segment_size(base_size: u32, size_scale: f64) -> u32 {
    round_half_even(f64::from(base_size) * size_scale).max(1) as u32
}

/// Measure every segment at `base_size`.
pub fn measure_row(
    m: &mut dyn TextMeasure,
    specs: &[SegmentSpec],
    base_size: u32,
) -> ThumbResult<SegmentRow> {
    let mut row = SegmentRow {
        base_size,
        total_width: 0,
        max_ascent: 0,
        max_descent: 0,
        segments: Vec::with_capacity(specs.len()),
    };
    for spec in specs {
        let size = segment_size(base_size, spec.size_scale);
        let width = m.text_width(&spec.font, size, &spec.text)?;
        let metrics = m.metrics(&spec.font, size)?;
        row.total_width += width + spec.x_adjust;
        row.max_ascent = row.max_ascent.max(metrics.ascent);
        row.max_descent = row.max_descent.max(metrics.descent);
        row.segments.push(MeasuredSegment {
            text: spec.text.clone(),
            font: spec.font.clone(),
            size,
            width,
            x_adjust: spec.x_adjust,
            metrics,
        });
    }
    Ok(row)
}

/// Largest base size (step 2 from `max_size`) whose row fits `max_width`, else `min_size`.
///
/// Segments with empty text are dropped first; `None` when nothing is left to draw.
pub fn fit_segments(
    m: &mut dyn TextMeasure,
    specs: &[SegmentSpec],
    max_size: u32,
    min_size: u32,
    max_width: i32,
) -> ThumbResult<Option<SegmentRow>> {
    let specs: Vec<SegmentSpec> = specs.iter().filter(|s| !s.text.is_empty()).cloned().collect();
    if specs.is_empty() {
        return Ok(None);
    }
    let max_size = max_size.max(1);
    let min_size = min_size.max(1);
    if min_size <= max_size {
        for size in (min_size..=max_size).rev().step_by(2) {
            let row = measure_row(m, &specs, size)?;
            if max_width <= 0 || row.total_width <= max_width {
                return Ok(Some(row));
            }
        }
    }
    measure_row(m, &specs, min_size).map(Some)
}

#[cfg(test)]
#[path = "../../tests/unit/text/segments.rs"]
mod tests;

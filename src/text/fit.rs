use crate::foundation::error::ThumbResult;
use crate::text::measure::TextMeasure;
use std::path::Path;

const ELLIPSIS: &str = "...";

/// Greedy word wrap at one font size.
///
/// Returns `None` when a single word is wider than `max_width` or more than `max_lines` lines
/// would be needed. Whitespace-only text wraps to one empty line.
pub fn wrap_text(
    m: &mut dyn TextMeasure,
    font: &Path,
    size: u32,
    text: &str,
    max_width: i32,
    max_lines: usize,
) -> ThumbResult<Option<Vec<String>>> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Some(vec![String::new()]));
    };
    let mut current = first.to_owned();
    if m.text_width(font, size, &current)? > max_width {
        return Ok(None);
    }

    let mut lines = Vec::new();
    for word in words {
        let candidate = format!("{current} {word}");
        if m.text_width(font, size, &candidate)? <= max_width {
            current = candidate;
            continue;
        }
        lines.push(std::mem::replace(&mut current, word.to_owned()));
        if m.text_width(font, size, &current)? > max_width || lines.len() >= max_lines {
            return Ok(None);
        }
    }
    lines.push(current);
    if lines.len() > max_lines {
        return Ok(None);
    }
    Ok(Some(lines))
}

/// Trim `text` until `text + "..."` fits. Text that already fits is returned as-is; if nothing
/// fits the original is kept.
pub fn truncate_text(
    m: &mut dyn TextMeasure,
    font: &Path,
    size: u32,
    text: &str,
    max_width: i32,
) -> ThumbResult<String> {
    if m.text_width(font, size, text)? <= max_width {
        return Ok(text.to_owned());
    }
    let mut trimmed = text.to_owned();
    while !trimmed.is_empty() && m.text_width(font, size, &format!("{trimmed}{ELLIPSIS}"))? > max_width
    {
        trimmed.pop();
        let keep = trimmed.trim_end().len();
        trimmed.truncate(keep);
    }
    if trimmed.is_empty() {
        Ok(text.to_owned())
    } else {
        Ok(format!("{trimmed}{ELLIPSIS}"))
    }
}

/// Chosen size and wrapped lines for a simple text block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FitResult {
    pub size: u32,
    pub lines: Vec<String>,
    /// The text did not fit at `min_size` and was shortened with an ellipsis.
    pub truncated: bool,
}

/// Largest size from `max_size` down to `min_size` (step 2) at which `text` wraps.
///
/// Falls back to `min_size` with the text truncated to one line when nothing wraps.
pub fn fit_text(
    m: &mut dyn TextMeasure,
    font: &Path,
    text: &str,
    max_size: u32,
    min_size: u32,
    max_width: i32,
    max_lines: usize,
) -> ThumbResult<FitResult> {
    let max_size = max_size.max(1);
    let min_size = min_size.max(1);
    if min_size <= max_size {
        for size in (min_size..=max_size).rev().step_by(2) {
            if let Some(lines) = wrap_text(m, font, size, text, max_width, max_lines)? {
                return Ok(FitResult {
                    size,
                    lines,
                    truncated: false,
                });
            }
        }
    }

    if let Some(lines) = wrap_text(m, font, min_size, text, max_width, max_lines)? {
        return Ok(FitResult {
            size: min_size,
            lines,
            truncated: false,
        });
    }
    let line = truncate_text(m, font, min_size, text, max_width)?;
    tracing::debug!(text, shortened = %line, size = min_size, "text truncated to fit");
    Ok(FitResult {
        size: min_size,
        lines: vec![line],
        truncated: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;

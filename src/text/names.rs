use crate::config::model::TextBlockDef;
use crate::foundation::core::{
    BASE_BORDER, BASE_LINE_SPACING, BASE_MARGIN_X, BASE_MARGIN_Y, round_half_even,
};
use crate::foundation::error::ThumbResult;
use crate::text::block::{BlockLayout, LayoutEnv, PlacedRun, TextStyle, size_range};
use crate::text::fit::fit_text;
use crate::text::measure::TextMeasure;
use std::path::Path;

const BASE_NAME_FONT_SIZE: i32 = 220;
const BASE_NAME_MIN_FONT_SIZE: i32 = 28;
const BASE_NAME_CENTER_GAP: i32 = 160;

/// How the two names are placed horizontally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamesAlign {
    /// Left name starts at the left padding, right name ends at the right padding.
    #[default]
    Edge,
    /// Each name is centered in its half of the canvas, outside the center gap.
    Center,
}

/// Both player names after fitting.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlayerNamesLayout {
    pub align: NamesAlign,
    pub left: BlockLayout,
    pub right: BlockLayout,
}

impl PlayerNamesLayout {
    pub fn runs(&self) -> impl Iterator<Item = &PlacedRun> {
        self.left.runs.iter().chain(self.right.runs.iter())
    }
}

struct FittedName {
    size: u32,
    lines: Vec<String>,
    truncated: bool,
    ascent: i32,
    line_height: i32,
    height: i32,
}

/// Lay out the two player names against a shared width budget.
///
/// Each name is fit independently; both are then centered vertically on the taller block.
/// Returns `None` when the block is disabled or both names are empty.
pub fn layout_player_names(
    m: &mut dyn TextMeasure,
    env: &LayoutEnv<'_>,
    def: &TextBlockDef,
    left_text: &str,
    right_text: &str,
) -> ThumbResult<Option<PlayerNamesLayout>> {
    const NAME: &str = "player_names";
    if !def.is_enabled() {
        return Ok(None);
    }
    let left_text = left_text.trim();
    let right_text = right_text.trim();
    if left_text.is_empty() && right_text.is_empty() {
        return Ok(None);
    }

    let geom = env.geom;
    let font = env.font_path(NAME, def.font_path.as_deref())?;
    let (max_size, min_size) = size_range(
        env,
        NAME,
        Some(def.max_size.unwrap_or(BASE_NAME_FONT_SIZE)),
        Some(def.min_size.unwrap_or(BASE_NAME_MIN_FONT_SIZE)),
    )?;
    let max_lines = def.max_lines.filter(|n| *n > 0).unwrap_or(1) as usize;
    let align = match def.align.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("center") => NamesAlign::Center,
        _ => NamesAlign::Edge,
    };
    let x_padding = geom.sx(def.x_padding.unwrap_or(BASE_BORDER + BASE_MARGIN_X));
    let center_gap = geom.sx(def.center_gap.unwrap_or(BASE_NAME_CENTER_GAP));
    let y = geom.sy(def.y.unwrap_or(BASE_MARGIN_Y));
    let line_spacing = geom.sy(def.line_spacing.unwrap_or(BASE_LINE_SPACING));
    let style = env.style(NAME, def);

    let half = f64::from(geom.width) / 2.0;
    let zone = half - f64::from(center_gap) - f64::from(x_padding);
    let max_width = match def.max_width.filter(|w| *w > 0) {
        Some(w) => geom.sx(w),
        None => round_half_even(zone).max(1) as i32,
    };

    let mut fit_name = |text: &str| -> ThumbResult<FittedName> {
        let fit = fit_text(m, &font, text, max_size, min_size, max_width, max_lines)?;
        let metrics = m.metrics(&font, fit.size)?;
        let n = fit.lines.len() as i32;
        let line_height = metrics.line_height();
        Ok(FittedName {
            size: fit.size,
            truncated: fit.truncated,
            ascent: metrics.ascent,
            line_height,
            height: if n > 0 {
                line_height * n + line_spacing * (n - 1)
            } else {
                0
            },
            lines: fit.lines,
        })
    };
    let left = fit_name(left_text)?;
    let right = fit_name(right_text)?;

    let tallest = left.height.max(right.height);
    let left_y = y + (tallest - left.height).div_euclid(2);
    let right_y = y + (tallest - right.height).div_euclid(2);

    // Each line's x from its measured width.
    let place_left = |w: i32| -> i32 {
        match align {
            NamesAlign::Edge => x_padding,
            NamesAlign::Center => {
                round_half_even(f64::from(x_padding) + zone / 2.0 - f64::from(w) / 2.0) as i32
            }
        }
    };
    let place_right = |w: i32| -> i32 {
        match align {
            NamesAlign::Edge => geom.width as i32 - x_padding - w,
            NamesAlign::Center => round_half_even(
                half + f64::from(center_gap) + zone / 2.0 - f64::from(w) / 2.0,
            ) as i32,
        }
    };

    let left = place_lines(
        m,
        &font,
        "player_names.left",
        left,
        left_y,
        line_spacing,
        style,
        &place_left,
    )?;
    let right = place_lines(
        m,
        &font,
        "player_names.right",
        right,
        right_y,
        line_spacing,
        style,
        &place_right,
    )?;
    tracing::debug!(
        left_size = left.size,
        right_size = right.size,
        max_width,
        "laid out player names"
    );
    Ok(Some(PlayerNamesLayout { align, left, right }))
}

#[allow(clippy::too_many_arguments)]
fn place_lines(
    m: &mut dyn TextMeasure,
    font: &Path,
    name: &str,
    fitted: FittedName,
    top: i32,
    line_spacing: i32,
    style: TextStyle,
    place: &dyn Fn(i32) -> i32,
) -> ThumbResult<BlockLayout> {
    let mut runs = Vec::with_capacity(fitted.lines.len());
    let mut cursor = top;
    let mut left = i32::MAX;
    let mut right = i32::MIN;
    for line in fitted.lines {
        let w = m.text_width(font, fitted.size, &line)?;
        let x = place(w);
        left = left.min(x);
        right = right.max(x + w);
        runs.push(PlacedRun {
            text: line,
            font: font.to_path_buf(),
            size: fitted.size,
            x,
            y: cursor,
            ascent: fitted.ascent,
            style,
        });
        cursor += fitted.line_height + line_spacing;
    }
    if runs.is_empty() {
        left = 0;
        right = 0;
    }
    Ok(BlockLayout {
        name: name.to_owned(),
        x: left,
        y: top,
        width: right - left,
        height: fitted.height,
        size: fitted.size,
        truncated: fitted.truncated,
        runs,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/names.rs"]
mod tests;

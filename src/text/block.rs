//! Text block layout.
//!
//! A block is either a single string, word-wrapped at the largest size that fits, or a row of
//! styled segments sharing one baseline. Both produce [`PlacedRun`]s in canvas pixels; painting
//! happens later in [`crate::text::paint`].

use crate::config::load::resolve_path;
use crate::config::model::{TextBlockDef, TextConfigDef};
use crate::foundation::color::{Rgba8, parse_color_or};
use crate::foundation::core::{
    BASE_LINE_SPACING, BASE_TEXT_STROKE_WIDTH, CanvasGeometry, DESIGN_WIDTH,
};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::text::fit::fit_text;
use crate::text::measure::TextMeasure;
use crate::text::names::{PlayerNamesLayout, layout_player_names};
use crate::text::segments::{EVENT_NUMBER_TOKEN, SegmentSpec, event_number_token, fit_segments};
use std::path::{Path, PathBuf};

/// Horizontal alignment of a block against its `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

impl Align {
    fn parse(s: Option<&str>) -> Self {
        match s.map(str::to_ascii_lowercase).as_deref() {
            Some("right") => Self::Right,
            Some("center") => Self::Center,
            _ => Self::Left,
        }
    }

    /// Left edge of a run of `width` aligned against `x`.
    pub fn origin(self, x: i32, width: i32) -> i32 {
        match self {
            Self::Left => x,
            Self::Right => x - width,
            Self::Center => x - width.div_euclid(2),
        }
    }
}

/// Vertical anchoring of a block against its `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Top,
    Center,
    Bottom,
}

impl Anchor {
    fn parse(s: Option<&str>) -> Self {
        match s.map(str::to_ascii_lowercase).as_deref() {
            Some("center") => Self::Center,
            Some("bottom") => Self::Bottom,
            _ => Self::Top,
        }
    }

    /// Top edge of a block of `height` anchored at `y`.
    pub fn origin(self, y: i32, height: i32) -> i32 {
        match self {
            Self::Top => y,
            Self::Center => y - height.div_euclid(2),
            Self::Bottom => y - height,
        }
    }
}

/// Fill and stroke used when painting a run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TextStyle {
    pub fill: Rgba8,
    pub stroke_fill: Rgba8,
    /// Stroke width in canvas pixels, at least 1.
    pub stroke_width: u32,
}

/// A single line of text at a fixed position.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlacedRun {
    pub text: String,
    pub font: PathBuf,
    pub size: u32,
    /// Left edge in canvas pixels.
    pub x: i32,
    /// Top of the line box in canvas pixels.
    pub y: i32,
    /// Baseline offset from `y`.
    pub ascent: i32,
    pub style: TextStyle,
}

/// Where a block landed, plus the runs that draw it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BlockLayout {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Chosen font size (the base size for segmented blocks).
    pub size: u32,
    pub truncated: bool,
    pub runs: Vec<PlacedRun>,
}

impl BlockLayout {
    /// Bottom edge; the next stacked block starts here.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Canvas and project context for laying out text.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEnv<'a> {
    /// Relative font paths resolve against this directory.
    pub root: &'a Path,
    pub geom: CanvasGeometry,
}

impl LayoutEnv<'_> {
    pub(crate) fn font_path(&self, name: &str, value: Option<&str>) -> ThumbResult<PathBuf> {
        match resolve_path(self.root, value) {
            Some(p) if p.is_file() => Ok(p),
            Some(p) => Err(ThumbError::config(format!(
                "{name} font file does not exist: '{}'",
                p.display()
            ))),
            None => Err(ThumbError::config(format!("{name} font_path is not set"))),
        }
    }

    /// Style of a block; an unreadable color falls back to its default with a warning.
    pub(crate) fn style(&self, name: &str, def: &TextBlockDef) -> TextStyle {
        let color = |key: &str, v: Option<&str>, default: Rgba8| match v {
            Some(s) => parse_color_or(&format!("{name}.{key}"), s, default),
            None => default,
        };
        let stroke = def.stroke_width.unwrap_or(BASE_TEXT_STROKE_WIDTH);
        TextStyle {
            fill: color("fill", def.fill.as_deref(), Rgba8::WHITE),
            stroke_fill: color("stroke_fill", def.stroke_fill.as_deref(), Rgba8::BLACK),
            stroke_width: self.geom.sy(stroke).max(1) as u32,
        }
    }
}

/// Size bounds of a block in canvas pixels.
pub(crate) fn size_range(
    env: &LayoutEnv<'_>,
    name: &str,
    max_size: Option<i32>,
    min_size: Option<i32>,
) -> ThumbResult<(u32, u32)> {
    let max_base = max_size.unwrap_or(0);
    if max_base <= 0 {
        return Err(ThumbError::config(format!(
            "{name} max_size must be a positive integer"
        )));
    }
    let min_base = min_size.unwrap_or(max_base);
    let max = env.geom.sy(max_base).max(1) as u32;
    let min = env.geom.sy(min_base).max(1) as u32;
    Ok((max, min))
}

/// Lay out one block.
///
/// `companion_text` supplies the event number token when the block's own text has none.
/// `stack_y` is the previous block's bottom edge. Returns `None` for disabled or empty blocks.
pub fn layout_block(
    m: &mut dyn TextMeasure,
    env: &LayoutEnv<'_>,
    name: &str,
    def: &TextBlockDef,
    companion_text: Option<&str>,
    stack_y: Option<i32>,
) -> ThumbResult<Option<BlockLayout>> {
    if !def.is_enabled() {
        return Ok(None);
    }
    let text = def
        .text
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_owned();
    let geom = env.geom;

    let max_width_base = def
        .max_width
        .filter(|w| *w > 0)
        .unwrap_or(DESIGN_WIDTH as i32);
    let max_width = geom.sx(max_width_base);
    let align = Align::parse(def.align.as_deref());
    let anchor = Anchor::parse(def.anchor.as_deref());

    let mut y = geom.sy(def.y.unwrap_or(0));
    if def.stack.unwrap_or(false) {
        if let Some(prev) = stack_y {
            y = prev + geom.sy(def.stack_gap.unwrap_or(0));
        }
    }
    let x = geom.sx(def.x.unwrap_or(0));

    // A segment list, even one with no usable entry, replaces `text`.
    if let Some(segments) = def.segments.as_ref() {
        let (max_size, min_size) = size_range(env, name, def.max_size, def.min_size)?;
        let base_font = env.font_path(name, def.font_path.as_deref())?;
        let style = env.style(name, def);

        let token = event_number_token(&text)
            .or_else(|| companion_text.and_then(event_number_token))
            .map(str::to_owned);

        let mut specs = Vec::with_capacity(segments.len());
        for seg in segments {
            let mut seg_text = seg.text.clone().unwrap_or_default();
            if let Some(token) = &token {
                seg_text = seg_text.replace(EVENT_NUMBER_TOKEN, token);
            }
            if seg_text.is_empty() {
                continue;
            }
            let font = match seg.font_path.as_deref().filter(|s| !s.is_empty()) {
                Some(p) => env.font_path(name, Some(p))?,
                None => base_font.clone(),
            };
            specs.push(SegmentSpec {
                text: seg_text,
                size_scale: seg.size_scale.unwrap_or(1.0),
                font,
                x_adjust: geom.sx(seg.x_adjust.unwrap_or(0)),
            });
        }

        let Some(row) = fit_segments(m, &specs, max_size, min_size, max_width)? else {
            return Ok(None);
        };
        let height = row.height();
        let start_y = anchor.origin(y, height);
        let start_x = align.origin(x, row.total_width);
        let baseline = start_y + row.max_ascent;

        let mut runs = Vec::with_capacity(row.segments.len());
        let mut cursor = start_x;
        for seg in &row.segments {
            runs.push(PlacedRun {
                text: seg.text.clone(),
                font: seg.font.clone(),
                size: seg.size,
                x: cursor,
                y: baseline - seg.metrics.ascent,
                ascent: seg.metrics.ascent,
                style,
            });
            cursor += seg.width + seg.x_adjust;
        }
        tracing::debug!(block = name, size = row.base_size, x = start_x, y = start_y, "laid out segmented block");
        return Ok(Some(BlockLayout {
            name: name.to_owned(),
            x: start_x,
            y: start_y,
            width: row.total_width,
            height,
            size: row.base_size,
            truncated: false,
            runs,
        }));
    }

    if text.is_empty() {
        return Ok(None);
    }

    let font = env.font_path(name, def.font_path.as_deref())?;
    let (max_size, min_size) = size_range(env, name, def.max_size, def.min_size)?;
    let max_lines = def.max_lines.filter(|n| *n > 0).unwrap_or(1) as usize;
    let style = env.style(name, def);
    let line_spacing = geom.sy(def.line_spacing.unwrap_or(BASE_LINE_SPACING));

    let fit = fit_text(m, &font, &text, max_size, min_size, max_width, max_lines)?;
    let metrics = m.metrics(&font, fit.size)?;
    let line_height = metrics.line_height();
    let n = fit.lines.len() as i32;
    let height = line_height * n + line_spacing * (n - 1).max(0);
    let start_y = anchor.origin(y, height);

    let mut runs = Vec::with_capacity(fit.lines.len());
    let mut cursor_y = start_y;
    let mut left = i32::MAX;
    let mut right = i32::MIN;
    for line in &fit.lines {
        let w = m.text_width(&font, fit.size, line)?;
        let line_x = align.origin(x, w);
        left = left.min(line_x);
        right = right.max(line_x + w);
        runs.push(PlacedRun {
            text: line.clone(),
            font: font.clone(),
            size: fit.size,
            x: line_x,
            y: cursor_y,
            ascent: metrics.ascent,
            style,
        });
        cursor_y += line_height + line_spacing;
    }
    tracing::debug!(block = name, size = fit.size, lines = n, x = left, y = start_y, "laid out text block");
    Ok(Some(BlockLayout {
        name: name.to_owned(),
        x: left,
        y: start_y,
        width: right - left,
        height,
        size: fit.size,
        truncated: fit.truncated,
        runs,
    }))
}

/// Every text layer of a thumbnail in draw order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct TextLayers {
    /// `event_title`, `event_number`, `round_title` then `vs_logo`, skipping empty ones.
    pub blocks: Vec<BlockLayout>,
    pub player_names: Option<PlayerNamesLayout>,
}

impl TextLayers {
    /// Runs of every layer in paint order.
    pub fn runs(&self) -> impl Iterator<Item = &PlacedRun> {
        self.blocks
            .iter()
            .flat_map(|b| b.runs.iter())
            .chain(self.player_names.iter().flat_map(|n| n.runs()))
    }
}

/// Lay out the stacked blocks, the VS logo and the player names.
pub fn layout_text_layers(
    m: &mut dyn TextMeasure,
    env: &LayoutEnv<'_>,
    cfg: &TextConfigDef,
    left_name: &str,
    right_name: &str,
) -> ThumbResult<TextLayers> {
    let companion = cfg
        .event_number
        .as_ref()
        .map(TextBlockDef::enabled_text)
        .filter(|s| !s.is_empty());

    let mut layers = TextLayers::default();
    let mut stack_y = None;
    for (name, block) in [
        ("event_title", &cfg.event_title),
        ("event_number", &cfg.event_number),
        ("round_title", &cfg.round_title),
    ] {
        let Some(def) = block else { continue };
        if let Some(laid) = layout_block(m, env, name, def, companion.as_deref(), stack_y)? {
            stack_y = Some(laid.bottom());
            layers.blocks.push(laid);
        }
    }
    if let Some(def) = &cfg.vs_logo {
        if let Some(laid) = layout_block(m, env, "vs_logo", def, companion.as_deref(), None)? {
            layers.blocks.push(laid);
        }
    }
    layers.player_names = match &cfg.player_names {
        Some(def) => layout_player_names(m, env, def, left_name, right_name)?,
        None => None,
    };
    Ok(layers)
}

#[cfg(test)]
#[path = "../../tests/unit/text/block.rs"]
mod tests;

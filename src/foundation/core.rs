use crate::foundation::error::{ThumbError, ThumbResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Width of the design space every layout constant is authored in.
pub const DESIGN_WIDTH: u32 = 1920;
/// Height of the design space every layout constant is authored in.
pub const DESIGN_HEIGHT: u32 = 1080;

pub(crate) const BASE_BORDER: i32 = 50;
pub(crate) const BASE_MARGIN_X: i32 = 80;
pub(crate) const BASE_MARGIN_Y: i32 = 60;
pub(crate) const BASE_LINE_SPACING: i32 = 10;
pub(crate) const BASE_TEXT_STROKE_WIDTH: i32 = 8;

const CHARACTER_BOX_WIDTH_RATIO: f64 = 0.396;
const CHARACTER_BOX_HEIGHT_RATIO: f64 = 0.63;

/// Which half of the canvas a character occupies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player one, anchored to the left border.
    Left,
    /// Player two, anchored to the right border.
    Right,
}

impl Side {
    /// The other side of the canvas.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Capitalized label used in sprite file names (`"<color> Left"`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Parse `left`/`right` case-insensitively.
    pub fn parse(s: &str) -> ThumbResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ThumbError::config(format!(
                "side must be 'left' or 'right', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to the nearest integer, ties to even.
pub fn round_half_even(v: f64) -> i64 {
    v.round_ties_even() as i64
}

/// Scale a design-space value into actual canvas pixels.
pub fn scale_value(value: i32, scale: f64) -> i32 {
    round_half_even(f64::from(value) * scale) as i32
}

/// Actual canvas size plus the factors mapping design space onto it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CanvasGeometry {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// `width / 1920`.
    pub scale_x: f64,
    /// `height / 1080`.
    pub scale_y: f64,
}

impl CanvasGeometry {
    /// Build the geometry for a base canvas of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> ThumbResult<Self> {
        if width == 0 || height == 0 {
            return Err(ThumbError::config("base canvas must be non-empty"));
        }
        Ok(Self {
            width,
            height,
            scale_x: f64::from(width) / f64::from(DESIGN_WIDTH),
            scale_y: f64::from(height) / f64::from(DESIGN_HEIGHT),
        })
    }

    /// Scale a horizontal design-space value.
    pub fn sx(&self, value: i32) -> i32 {
        scale_value(value, self.scale_x)
    }

    /// Scale a vertical design-space value.
    pub fn sy(&self, value: i32) -> i32 {
        scale_value(value, self.scale_y)
    }

    /// Border inset (scaled vertically on both axes).
    pub fn border(&self) -> i32 {
        self.sy(BASE_BORDER)
    }

    pub fn margin_x(&self) -> i32 {
        self.sx(BASE_MARGIN_X)
    }

    pub fn margin_y(&self) -> i32 {
        self.sy(BASE_MARGIN_Y)
    }

    /// Box every character sprite is scaled to fit before overrides apply.
    pub fn character_box(&self) -> (u32, u32) {
        let w = round_half_even(f64::from(self.width) * CHARACTER_BOX_WIDTH_RATIO);
        let h = round_half_even(f64::from(self.height) * CHARACTER_BOX_HEIGHT_RATIO);
        (w.max(1) as u32, h.max(1) as u32)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

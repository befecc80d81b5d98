use crate::config::model::OutlineDef;
use crate::foundation::color::{Rgba8, parse_color_or};
use crate::foundation::core::CanvasGeometry;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::math::{
    premul_over_px, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
use image::RgbaImage;
use serde_json::Value;

/// Solid silhouette ring drawn around each character sprite.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct OutlineConfig {
    pub enabled: bool,
    /// Ring thickness in design-space pixels; never negative.
    pub size: u32,
    pub color: Rgba8,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 0,
            color: Rgba8::BLACK,
        }
    }
}

impl OutlineConfig {
    /// Parse `character_outline`. A missing or non-object value disables the outline.
    pub fn from_value(v: Option<&Value>) -> ThumbResult<Self> {
        let Some(v) = v.filter(|v| v.is_object()) else {
            return Ok(Self::default());
        };
        let def: OutlineDef = serde_json::from_value(v.clone())
            .map_err(|e| ThumbError::serde(format!("parse character_outline: {e}")))?;
        let color = match def.color {
            Some(Value::String(s)) => parse_color_or("character_outline.color", &s, Rgba8::BLACK),
            _ => Rgba8::BLACK,
        };
        Ok(Self {
            enabled: def.enabled.unwrap_or(false),
            size: def.size.unwrap_or(0).max(0) as u32,
            color,
        })
    }

    /// Outline thickness in canvas pixels; 0 when disabled.
    pub fn pixels(&self, geom: &CanvasGeometry) -> u32 {
        if !self.enabled {
            return 0;
        }
        geom.sy(self.size as i32).max(0) as u32
    }
}

/// Grow the alpha plane by a square max filter of side `window`.
fn dilate(alpha: &[u8], w: usize, h: usize, window: usize) -> Vec<u8> {
    let r = window / 2;
    let mut tmp = vec![0u8; alpha.len()];
    for y in 0..h {
        let row = &alpha[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            tmp[y * w + x] = row[lo..=hi].iter().copied().max().unwrap_or(0);
        }
    }
    let mut out = vec![0u8; alpha.len()];
    for x in 0..w {
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r).min(h - 1);
            out[y * w + x] = (lo..=hi).map(|yy| tmp[yy * w + x]).max().unwrap_or(0);
        }
    }
    out
}

/// Surround the sprite with a `size`-pixel ring of `color`.
///
/// The result is `2 * size` larger in each dimension; the sprite sits at `(size, size)`.
/// `size == 0` returns an identical copy.
pub fn apply_outline(img: &RgbaImage, size: u32, color: Rgba8) -> RgbaImage {
    if size == 0 {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let (pw, ph) = (w + 2 * size, h + 2 * size);

    let mut padded = RgbaImage::new(pw, ph);
    image::imageops::replace(&mut padded, img, i64::from(size), i64::from(size));

    let alpha: Vec<u8> = padded.pixels().map(|p| p.0[3]).collect();
    let window = (2 * size as usize + 1).max(3);
    let grown = dilate(&alpha, pw as usize, ph as usize, window);

    let fill = color.opaque();
    let mut ring = Vec::with_capacity(alpha.len() * 4);
    for (g, a) in grown.iter().zip(&alpha) {
        ring.extend_from_slice(&[fill.r, fill.g, fill.b, g.saturating_sub(*a)]);
    }
    premultiply_rgba8_in_place(&mut ring);

    let mut top = padded.into_raw();
    premultiply_rgba8_in_place(&mut top);
    for (dst, src) in ring.chunks_exact_mut(4).zip(top.chunks_exact(4)) {
        let out = premul_over_px(
            [dst[0], dst[1], dst[2], dst[3]],
            [src[0], src[1], src[2], src[3]],
        );
        dst.copy_from_slice(&out);
    }
    unpremultiply_rgba8_in_place(&mut ring);

    RgbaImage::from_raw(pw, ph, ring).unwrap_or_else(|| RgbaImage::new(pw, ph))
}

#[cfg(test)]
#[path = "../../tests/unit/sprite/outline.rs"]
mod tests;

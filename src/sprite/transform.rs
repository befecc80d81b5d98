use crate::foundation::core::{CanvasGeometry, round_half_even};
use crate::overrides::cascade::ResolvedOverride;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Upscale ceiling for scale-to-fit; small source art blurs past this.
pub const MAX_UPSCALE: f64 = 1.6;

/// Bounding box `(x, y, w, h)` of pixels with non-zero alpha.
pub fn opaque_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = img.dimensions();
    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;
    for (x, y, px) in img.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        any = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    any.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop to the alpha bounding box. A fully transparent image is returned unchanged.
pub fn crop_to_opaque(img: RgbaImage) -> RgbaImage {
    match opaque_bounds(&img) {
        Some((x, y, w, h)) if (w, h) != img.dimensions() => {
            imageops::crop_imm(&img, x, y, w, h).to_image()
        }
        _ => img,
    }
}

/// Scale factor that fits `w x h` inside `max_w x max_h`, capped at [`MAX_UPSCALE`].
///
/// Returns `None` for a non-positive box or an empty source.
pub fn fit_scale(w: u32, h: u32, max_w: i32, max_h: i32) -> Option<f64> {
    if max_w <= 0 || max_h <= 0 || w == 0 || h == 0 {
        return None;
    }
    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    Some(scale.min(MAX_UPSCALE))
}

/// Height the image would have after scale-to-fit, before rounding.
pub fn fitted_height(img: &RgbaImage, max_w: i32, max_h: i32) -> f64 {
    let (w, h) = img.dimensions();
    fit_scale(w, h, max_w, max_h).map_or(f64::from(h), |s| f64::from(h) * s)
}

/// Resize uniformly by `scale` with Lanczos3; each output side is at least 1 px.
pub fn resize_uniform(img: &RgbaImage, scale: f64) -> RgbaImage {
    let (w, h) = img.dimensions();
    let nw = round_half_even(f64::from(w) * scale).max(1) as u32;
    let nh = round_half_even(f64::from(h) * scale).max(1) as u32;
    imageops::resize(img, nw, nh, FilterType::Lanczos3)
}

/// Scale `img` to fit the box. No-op for a non-positive box or a factor of exactly 1.
pub fn scale_to_fit(img: RgbaImage, max_w: i32, max_h: i32) -> RgbaImage {
    let (w, h) = img.dimensions();
    match fit_scale(w, h, max_w, max_h) {
        Some(scale) if scale != 1.0 => resize_uniform(&img, scale),
        _ => img,
    }
}

/// Sprite after its override was applied, with offsets in canvas pixels.
#[derive(Clone, Debug)]
pub struct OverriddenSprite {
    pub image: RgbaImage,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Apply an override's scale and convert its design-space offsets to canvas pixels.
pub fn apply_override(
    img: RgbaImage,
    ov: &ResolvedOverride,
    geom: &CanvasGeometry,
) -> OverriddenSprite {
    let image = if ov.scale == 1.0 {
        img
    } else if ov.scale.is_finite() && ov.scale > 0.0 {
        resize_uniform(&img, ov.scale)
    } else {
        tracing::warn!(scale = ov.scale, "ignoring non-positive override scale, using 1.0");
        img
    };
    OverriddenSprite {
        image,
        offset_x: geom.sx(ov.offset_x),
        offset_y: geom.sy(ov.offset_y),
    }
}

/// Crop then fit: the raw sprite every placement starts from.
pub fn prepare_sprite(img: RgbaImage, box_w: u32, box_h: u32) -> RgbaImage {
    scale_to_fit(crop_to_opaque(img), box_w as i32, box_h as i32)
}

#[cfg(test)]
#[path = "../../tests/unit/sprite/transform.rs"]
mod tests;

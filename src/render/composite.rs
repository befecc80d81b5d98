use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::math::{
    premul_over_px, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
use crate::text::paint::TextOverlay;
use image::{RgbImage, RgbaImage};

/// Premultiplied RGBA8 working surface the thumbnail is composited on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Start from the base image.
    pub fn from_base(base: &RgbaImage) -> Self {
        let mut data = base.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width: base.width(),
            height: base.height(),
            data,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Source-over `sprite` with its top-left corner at `(x, y)`.
    ///
    /// The origin may be negative or past the canvas; only the overlapping part is drawn.
    pub fn draw_image(&mut self, sprite: &RgbaImage, x: i32, y: i32) {
        let (cw, ch) = (i64::from(self.width), i64::from(self.height));
        let (sw, sh) = (i64::from(sprite.width()), i64::from(sprite.height()));
        let (x, y) = (i64::from(x), i64::from(y));

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + sw).min(cw);
        let y1 = (y + sh).min(ch);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = sprite.as_raw();
        for cy in y0..y1 {
            let sy = cy - y;
            for cx in x0..x1 {
                let sx = cx - x;
                let si = ((sy * sw + sx) * 4) as usize;
                let s = &src[si..si + 4];
                if s[3] == 0 {
                    continue;
                }
                let mut px = [s[0], s[1], s[2], s[3]];
                premultiply_rgba8_in_place(&mut px);
                let di = ((cy * cw + cx) * 4) as usize;
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&premul_over_px(d, px));
            }
        }
    }

    /// Source-over a full-canvas text overlay.
    pub fn draw_overlay(&mut self, overlay: &TextOverlay) -> ThumbResult<()> {
        over_in_place(&mut self.data, &overlay.rgba8_premul).map_err(|e| {
            ThumbError::render(format!(
                "{e}: overlay {}x{} on canvas {}x{}",
                overlay.width, overlay.height, self.width, self.height
            ))
        })
    }

    /// Straight-alpha RGBA copy, used for previews.
    pub fn to_rgba_image(&self) -> ThumbResult<RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ThumbError::render("canvas buffer does not match its dimensions"))
    }

    /// Flatten to RGB by dropping alpha.
    pub fn to_rgb_image(&self) -> ThumbResult<RgbImage> {
        Ok(image::DynamicImage::ImageRgba8(self.to_rgba_image()?).to_rgb8())
    }
}

/// Source-over for two equally-sized premultiplied buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> Result<(), &'static str> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err("over_in_place expects equal-length rgba8 buffers");
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = premul_over_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

use crate::foundation::error::{ThumbError, ThumbResult};
use anyhow::Context;
use image::ImageFormat;

/// Codec support of the linked `image` build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Capabilities {
    pub png_decode: bool,
    pub png_encode: bool,
    pub jpeg_decode: bool,
    pub jpeg_encode: bool,
}

impl Capabilities {
    /// What the linked build advertises, without validating it.
    pub fn detect() -> Self {
        Self {
            png_decode: ImageFormat::Png.reading_enabled(),
            png_encode: ImageFormat::Png.writing_enabled(),
            jpeg_decode: ImageFormat::Jpeg.reading_enabled(),
            jpeg_encode: ImageFormat::Jpeg.writing_enabled(),
        }
    }

    /// Codecs rendering or editor previews cannot run without, by name.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("png decode", self.png_decode),
            ("png encode", self.png_encode),
            ("jpeg decode", self.jpeg_decode),
            ("jpeg encode", self.jpeg_encode),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
    }

    /// Check codec support and round-trip a pixel through PNG and JPEG before any rendering starts.
    pub fn probe() -> ThumbResult<Self> {
        let caps = Self::detect();
        let missing = caps.missing();
        if !missing.is_empty() {
            return Err(ThumbError::render(format!(
                "image build lacks required codecs: {}",
                missing.join(", ")
            )));
        }

        let px = image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4]));
        let mut buf = std::io::Cursor::new(Vec::new());
        px.write_to(&mut buf, ImageFormat::Png)
            .context("probe png encode")?;
        let back = image::load_from_memory_with_format(buf.get_ref(), ImageFormat::Png)
            .context("probe png decode")?
            .to_rgba8();
        if back.get_pixel(0, 0) != px.get_pixel(0, 0) {
            return Err(ThumbError::render("png probe round-trip changed the pixel"));
        }

        let rgb = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 40, 40]));
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 80)
            .encode_image(&rgb)
            .context("probe jpeg encode")?;
        image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
            .context("probe jpeg decode")?;
        tracing::debug!(?caps, "capability probe passed");
        Ok(caps)
    }
}

#[cfg(test)]
#[path = "../tests/unit/capability.rs"]
mod tests;

use crate::foundation::color::Rgba8;
use crate::foundation::core::Affine;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::text::block::PlacedRun;
use crate::text::engine::{TextBrush, TextEngine};

/// A transparent canvas-sized layer holding painted text, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextOverlay {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl TextOverlay {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba8_premul: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn paint_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Rasterize `runs` into a fresh overlay.
///
/// Each run is stroked first, with a pen twice the stroke width so the visible outline extends
/// `stroke_width` past the glyph edge, then filled on top.
pub fn paint_runs<'a>(
    engine: &mut TextEngine,
    width: u32,
    height: u32,
    runs: impl IntoIterator<Item = &'a PlacedRun>,
) -> ThumbResult<TextOverlay> {
    let (Ok(w16), Ok(h16)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(ThumbError::render(format!(
            "canvas {width}x{height} exceeds the text rasterizer limit of {}",
            u16::MAX
        )));
    };
    if width == 0 || height == 0 {
        return Ok(TextOverlay::empty(width, height));
    }

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    ctx.reset();
    let mut painted = 0usize;
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        let layout = engine.layout_line(&run.font, run.size, &run.text, run.style.fill.into())?;
        let Some(first) = layout.lines().next() else {
            continue;
        };
        let baseline = f64::from(first.metrics().baseline);
        let origin = Affine::translate((
            f64::from(run.x),
            f64::from(run.y + run.ascent) - baseline,
        ));
        ctx.set_transform(affine_to_cpu(origin));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let font = glyph_run.run().font();
                let size = glyph_run.run().font_size();
                let glyphs = || {
                    glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                };

                ctx.set_paint(paint_color(run.style.stroke_fill));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(
                    2.0 * f64::from(run.style.stroke_width),
                ));
                ctx.glyph_run(font).font_size(size).stroke_glyphs(glyphs());

                let TextBrush { r, g, b, a } = glyph_run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.glyph_run(font).font_size(size).fill_glyphs(glyphs());
            }
        }
        painted += 1;
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);
    tracing::debug!(runs = painted, width, height, "painted text overlay");
    Ok(TextOverlay {
        width,
        height,
        rgba8_premul: pixmap.data_as_u8_slice().to_vec(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/paint.rs"]
mod tests;

//! Thumbnail composition.
//!
//! Everything is authored in the 1920x1080 design space and scaled onto the actual base canvas.
//! Sprites are bottom-anchored inside the border and margins; outline synthesis grows a sprite
//! outward, so its origin is pulled back by the outline thickness.

use crate::assets::decode::{load_rgba, load_sprite};
use crate::assets::locator::{AssetLocator, AssetQuery, AssetSet, CharacterImage};
use crate::config::load::{LoadedEvent, resolve_path};
use crate::config::model::TextConfigDef;
use crate::foundation::core::{CanvasGeometry, Side};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::overrides::cascade::{OverrideSet, ResolvedOverride};
use crate::render::composite::Canvas;
use crate::sprite::outline::{OutlineConfig, apply_outline};
use crate::sprite::transform::{apply_override, prepare_sprite};
use crate::text::block::{LayoutEnv, TextLayers, layout_text_layers};
use crate::text::engine::TextEngine;
use crate::text::paint::{TextOverlay, paint_runs};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Base image used when neither the event config nor the caller names one.
pub const DEFAULT_BASE_IMAGE: &str = "assets/test6.jpg";
/// Character asset root, relative to the project root.
pub const DEFAULT_CHARACTER_DIR: &str = "assets/melee/characters";
pub const DEFAULT_COLOR: &str = "Default";

/// One matchup to render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThumbnailRequest {
    pub player1: String,
    pub player2: String,
    pub p1_character: String,
    pub p2_character: String,
    #[serde(default = "default_color")]
    pub p1_color: String,
    #[serde(default = "default_color")]
    pub p2_color: String,
    pub round: String,
    #[serde(default)]
    pub character_set: AssetSet,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

/// Everything a render needs from the current event, loaded once.
#[derive(Clone, Debug)]
pub struct EventContext {
    pub root: PathBuf,
    pub event: LoadedEvent,
    pub base: RgbaImage,
    pub geom: CanvasGeometry,
    pub overrides: OverrideSet,
    pub outline: OutlineConfig,
}

impl EventContext {
    /// Load the base image, overrides and outline of `event`.
    ///
    /// The event's `base_image` wins over `fallback_base`.
    pub fn load(
        root: impl Into<PathBuf>,
        event: LoadedEvent,
        fallback_base: Option<&str>,
    ) -> ThumbResult<Self> {
        let root = root.into();
        let base_value = event
            .def
            .base_image
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(fallback_base);
        let base_path = resolve_path(&root, base_value)
            .ok_or_else(|| ThumbError::config("base image path could not be resolved"))?;
        if !base_path.is_file() {
            return Err(ThumbError::config(format!(
                "base image not found: '{}'",
                base_path.display()
            )));
        }
        let base = load_rgba(&base_path)?;
        let geom = CanvasGeometry::new(base.width(), base.height())?;

        let overrides = OverrideSet::from_value(event.override_payload(&root)?.as_ref())?;
        let outline = OutlineConfig::from_value(event.def.character_outline.as_ref())?;
        tracing::debug!(
            base = %base_path.display(),
            width = geom.width,
            height = geom.height,
            characters = overrides.characters.len(),
            outline = outline.pixels(&geom),
            "loaded event context"
        );
        Ok(Self {
            root,
            event,
            base,
            geom,
            overrides,
            outline,
        })
    }

    /// The event's `text` object; rendering without one is an error.
    pub fn text_config(&self) -> ThumbResult<&TextConfigDef> {
        self.event.def.text.as_ref().ok_or_else(|| {
            ThumbError::config(format!(
                "event config missing text block: '{}'",
                self.event.path.display()
            ))
        })
    }

    pub fn layout_env(&self) -> LayoutEnv<'_> {
        LayoutEnv {
            root: &self.root,
            geom: self.geom,
        }
    }

    /// Outline thickness in canvas pixels.
    pub fn outline_px(&self) -> u32 {
        self.outline.pixels(&self.geom)
    }

    /// Locator over `<root>/<character_dir>/<set>`; the directory must exist.
    pub fn locator(&self, character_dir: &Path, set: AssetSet) -> ThumbResult<AssetLocator> {
        let dir = if character_dir.is_absolute() {
            character_dir.to_path_buf()
        } else {
            self.root.join(character_dir)
        };
        let set_root = dir.join(set.dir_name());
        if !set_root.is_dir() {
            return Err(ThumbError::asset_not_found(format!(
                "character set directory missing: '{}'",
                set_root.display()
            )));
        }
        Ok(AssetLocator::new(set_root))
    }
}

/// Replace `round_title.text` with the caller's round.
///
/// Empty rounds leave the config alone. A disabled block is kept as-is with a warning; a
/// missing block is an error.
pub fn apply_round(text: &mut TextConfigDef, round: &str) -> ThumbResult<()> {
    let round = round.trim();
    if round.is_empty() {
        return Ok(());
    }
    let Some(block) = text.round_title.as_mut() else {
        return Err(ThumbError::config("round_title config missing for event"));
    };
    if block.is_enabled() {
        block.text = Some(round.to_owned());
    } else {
        tracing::warn!(round, "round_title disabled in config; ignoring round");
    }
    Ok(())
}

/// The event's text config with `round` applied.
pub fn effective_text(ctx: &EventContext, round: &str) -> ThumbResult<TextConfigDef> {
    let mut text = ctx.text_config()?.clone();
    apply_round(&mut text, round)?;
    Ok(text)
}

/// A located sprite, cropped and fitted to the character box, before any override.
#[derive(Clone, Debug)]
pub struct PreparedSprite {
    pub source: CharacterImage,
    pub image: RgbaImage,
}

/// Locate, decode and fit the sprite for `character` on `asset_side`.
pub fn load_prepared(
    locator: &AssetLocator,
    geom: &CanvasGeometry,
    set: AssetSet,
    character: &str,
    color: &str,
    asset_side: Side,
) -> ThumbResult<PreparedSprite> {
    let (box_w, box_h) = geom.character_box();
    let source = locator.resolve(&AssetQuery {
        character,
        color,
        side: asset_side,
        set,
        fit_box: Some((box_w, box_h)),
    })?;
    let image = prepare_sprite(load_sprite(&source.path, source.mirror)?, box_w, box_h);
    Ok(PreparedSprite { source, image })
}

/// Where a sprite was drawn and how it got there.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SpritePlacement {
    pub side: Side,
    /// Draw origin in canvas pixels, outline included.
    pub x: i32,
    pub y: i32,
    /// Sprite size after the override scale, before the outline.
    pub width: u32,
    pub height: u32,
    /// Override offsets in canvas pixels.
    pub offset_x: i32,
    pub offset_y: i32,
    pub scale: f64,
    pub outline_px: u32,
}

impl SpritePlacement {
    /// Bottom edge of the sprite art, outline excluded.
    pub fn art_bottom(&self) -> i32 {
        self.y + self.outline_px as i32 + self.height as i32
    }
}

/// Top-left origin of a `width` x `height` sprite on `side`.
pub fn sprite_origin(
    geom: &CanvasGeometry,
    side: Side,
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
    outline_px: u32,
) -> (i32, i32) {
    let pad = outline_px as i32;
    let x = match side {
        Side::Left => geom.border() + geom.margin_x() + offset_x - pad,
        Side::Right => {
            geom.width as i32 - geom.border() - geom.margin_x() - width as i32 + offset_x - pad
        }
    };
    let y = geom.height as i32 - geom.border() - geom.margin_y() - height as i32 + offset_y - pad;
    (x, y)
}

/// A sprite ready to draw.
#[derive(Clone, Debug)]
pub struct PlacedSprite {
    pub image: RgbaImage,
    pub placement: SpritePlacement,
}

/// Apply the override, optional flip and outline to a prepared sprite and place it on `side`.
pub fn place_sprite(
    prepared: RgbaImage,
    ov: &ResolvedOverride,
    flip: bool,
    ctx: &EventContext,
    side: Side,
) -> PlacedSprite {
    let mut img = prepared;
    if flip {
        image::imageops::flip_horizontal_in_place(&mut img);
    }
    let sprite = apply_override(img, ov, &ctx.geom);
    let (width, height) = sprite.image.dimensions();
    let outline_px = ctx.outline_px();
    let (x, y) = sprite_origin(
        &ctx.geom,
        side,
        width,
        height,
        sprite.offset_x,
        sprite.offset_y,
        outline_px,
    );
    let image = if outline_px > 0 {
        apply_outline(&sprite.image, outline_px, ctx.outline.color)
    } else {
        sprite.image
    };
    PlacedSprite {
        image,
        placement: SpritePlacement {
            side,
            x,
            y,
            width,
            height,
            offset_x: sprite.offset_x,
            offset_y: sprite.offset_y,
            scale: ov.scale,
            outline_px,
        },
    }
}

/// Lay out and paint every text layer for the two display names.
pub fn render_text(
    ctx: &EventContext,
    engine: &mut TextEngine,
    text: &TextConfigDef,
    left_name: &str,
    right_name: &str,
) -> ThumbResult<(TextLayers, TextOverlay)> {
    let env = ctx.layout_env();
    let layers = layout_text_layers(engine, &env, text, left_name, right_name)?;
    let overlay = paint_runs(engine, ctx.geom.width, ctx.geom.height, layers.runs())?;
    Ok((layers, overlay))
}

/// Base, left sprite, right sprite, then text.
pub fn compose(
    base: &RgbaImage,
    left: &PlacedSprite,
    right: &PlacedSprite,
    overlay: &TextOverlay,
) -> ThumbResult<Canvas> {
    let mut canvas = Canvas::from_base(base);
    for s in [left, right] {
        canvas.draw_image(&s.image, s.placement.x, s.placement.y);
    }
    canvas.draw_overlay(overlay)?;
    Ok(canvas)
}

/// Resolution details for one side of a render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SpriteReport {
    pub character: String,
    pub requested_color: String,
    /// Color variant actually used.
    pub color: String,
    pub path: PathBuf,
    /// Final horizontal flip (asset mirror xor override mirror).
    pub mirrored: bool,
    pub use_other_side: bool,
    pub placement: SpritePlacement,
}

/// Computed layout of a finished thumbnail.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub left: SpriteReport,
    pub right: SpriteReport,
    pub text: TextLayers,
}

/// A composited thumbnail plus its report.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub canvas: Canvas,
    pub report: RenderReport,
}

fn render_side(
    ctx: &EventContext,
    locator: &AssetLocator,
    set: AssetSet,
    character: &str,
    color: &str,
    side: Side,
) -> ThumbResult<(PlacedSprite, SpriteReport)> {
    let ov = ctx.overrides.resolve(character, side);
    let asset_side = if ov.use_other_side {
        side.opposite()
    } else {
        side
    };
    let prepared = load_prepared(locator, &ctx.geom, set, character, color, asset_side)?;
    let placed = place_sprite(prepared.image, &ov, ov.mirror, ctx, side);
    let report = SpriteReport {
        character: character.to_owned(),
        requested_color: color.to_owned(),
        color: prepared.source.color,
        path: prepared.source.path,
        mirrored: prepared.source.mirror ^ ov.mirror,
        use_other_side: ov.use_other_side,
        placement: placed.placement,
    };
    Ok((placed, report))
}

/// Render one thumbnail for `req`.
#[tracing::instrument(skip(ctx, engine), fields(p1 = %req.p1_character, p2 = %req.p2_character))]
pub fn render_thumbnail(
    ctx: &EventContext,
    engine: &mut TextEngine,
    character_dir: &Path,
    req: &ThumbnailRequest,
) -> ThumbResult<Thumbnail> {
    let text = effective_text(ctx, &req.round)?;
    let locator = ctx.locator(character_dir, req.character_set)?;
    let (left, left_report) = render_side(
        ctx,
        &locator,
        req.character_set,
        &req.p1_character,
        &req.p1_color,
        Side::Left,
    )?;
    let (right, right_report) = render_side(
        ctx,
        &locator,
        req.character_set,
        &req.p2_character,
        &req.p2_color,
        Side::Right,
    )?;

    let (layers, overlay) = render_text(ctx, engine, &text, &req.player1, &req.player2)?;
    let canvas = compose(&ctx.base, &left, &right, &overlay)?;
    tracing::debug!(
        left_x = left.placement.x,
        right_x = right.placement.x,
        blocks = layers.blocks.len(),
        "composited thumbnail"
    );
    Ok(Thumbnail {
        canvas,
        report: RenderReport {
            width: ctx.geom.width,
            height: ctx.geom.height,
            left: left_report,
            right: right_report,
            text: layers,
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;

//! Interactive override editing.
//!
//! The session keeps a working copy of the event's `character_overrides`, re-parses it after
//! every edit, and only touches disk on [`EditorSession::save`]. Previews render the edited
//! character against a fixed opponent using cached pre-override sprites and cached text layers.

use crate::assets::locator::{AssetLocator, AssetSet};
use crate::config::load::{LoadedEvent, load_current_event, read_json_object};
use crate::foundation::core::Side;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::names::normalize_token;
use crate::overrides::cascade::{OverrideSet, ResolvedOverride};
use crate::render::composite::Canvas;
use crate::render::compositor::{
    DEFAULT_BASE_IMAGE, DEFAULT_COLOR, EventContext, compose, load_prepared, place_sprite,
    render_text,
};
use crate::text::engine::TextEngine;
use crate::text::paint::TextOverlay;
use anyhow::Context;
use image::RgbaImage;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Character shown on the other side of every preview.
pub const DEFAULT_OPPONENT: &str = "Fox";
pub const PREVIEW_JPEG_QUALITY: u8 = 80;

const OVERRIDES_KEY: &str = "character_overrides";
const LEGACY_SIDE_KEYS: [&str; 2] = ["raise", "mirror_left"];

/// Values the editor writes into one side block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SideValues {
    pub scale: f64,
    pub offset_x: i32,
    pub offset_y: i32,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub use_other_side: bool,
}

impl From<ResolvedOverride> for SideValues {
    fn from(ov: ResolvedOverride) -> Self {
        Self {
            scale: ov.scale,
            offset_x: ov.offset_x,
            offset_y: ov.offset_y,
            mirror: ov.mirror,
            use_other_side: ov.use_other_side,
        }
    }
}

impl From<SideValues> for ResolvedOverride {
    fn from(v: SideValues) -> Self {
        Self {
            scale: v.scale,
            offset_x: v.offset_x,
            offset_y: v.offset_y,
            mirror: v.mirror,
            use_other_side: v.use_other_side,
        }
    }
}

/// Effective values of one (character, side) page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageState {
    pub character: String,
    pub side: Side,
    #[serde(flatten)]
    pub values: SideValues,
    pub dirty: bool,
}

type PageKey = (String, Side);

/// One editing session over the current event.
pub struct EditorSession {
    ctx: EventContext,
    locator: AssetLocator,
    set: AssetSet,
    opponent: String,
    working: Map<String, Value>,
    dirty: BTreeSet<PageKey>,
    sprites: HashMap<PageKey, RgbaImage>,
    overlays: HashMap<(String, String), TextOverlay>,
    engine: TextEngine,
}

fn working_copy(event: &LoadedEvent) -> Map<String, Value> {
    match event.raw.get(OVERRIDES_KEY) {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    }
}

/// The object at `map[key]`, replacing a missing or non-object value with `{}`.
fn child_object(map: &mut Map<String, Value>, key: String) -> ThumbResult<&mut Map<String, Value>> {
    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        tracing::warn!(value = %slot, "replacing non-object override entry");
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
        .ok_or_else(|| ThumbError::config("override entry is not an object"))
}

fn page_key(character: &str, side: Side) -> PageKey {
    (normalize_token(character), side)
}

impl EditorSession {
    /// Start a session over `ctx` with sprites from `<character_dir>/<set>`.
    pub fn new(ctx: EventContext, character_dir: &Path, set: AssetSet) -> ThumbResult<Self> {
        let locator = ctx.locator(character_dir, set)?;
        let working = working_copy(&ctx.event);
        let mut session = Self {
            ctx,
            locator,
            set,
            opponent: DEFAULT_OPPONENT.to_owned(),
            working,
            dirty: BTreeSet::new(),
            sprites: HashMap::new(),
            overlays: HashMap::new(),
            engine: TextEngine::new(),
        };
        session.rebuild()?;
        Ok(session)
    }

    /// Open the current event of the project at `root`.
    pub fn open(root: &Path, character_dir: &Path, set: AssetSet) -> ThumbResult<Self> {
        let event = load_current_event(root)?;
        let ctx = EventContext::load(root, event, Some(DEFAULT_BASE_IMAGE))?;
        Self::new(ctx, character_dir, set)
    }

    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = opponent.into();
        self
    }

    pub fn event_path(&self) -> &Path {
        &self.ctx.event.path
    }

    pub fn overrides(&self) -> &OverrideSet {
        &self.ctx.overrides
    }

    /// The working override payload.
    pub fn working(&self) -> &Map<String, Value> {
        &self.working
    }

    /// Sorted character directory names available for editing.
    pub fn characters(&self) -> ThumbResult<Vec<String>> {
        self.locator.characters()
    }

    pub fn is_dirty(&self, character: &str, side: Side) -> bool {
        self.dirty.contains(&page_key(character, side))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn cached_sprites(&self) -> usize {
        self.sprites.len()
    }

    pub fn cached_overlays(&self) -> usize {
        self.overlays.len()
    }

    fn rebuild(&mut self) -> ThumbResult<()> {
        self.ctx.overrides = OverrideSet::from_value(Some(&Value::Object(self.working.clone())))?;
        Ok(())
    }

    /// Effective values for a page.
    pub fn page(&self, character: &str, side: Side) -> PageState {
        PageState {
            character: character.to_owned(),
            side,
            values: self.ctx.overrides.resolve(character, side).into(),
            dirty: self.is_dirty(character, side),
        }
    }

    /// Write `values` into the side block of `character` and mark the page dirty.
    ///
    /// An existing entry whose name normalizes to the same key is reused. Flags are only written
    /// when set.
    pub fn set_values(&mut self, character: &str, side: Side, values: SideValues) -> ThumbResult<()> {
        if !values.scale.is_finite() || values.scale <= 0.0 {
            return Err(ThumbError::config(format!(
                "scale must be a positive number, got {}",
                values.scale
            )));
        }
        let characters = child_object(&mut self.working, "characters".to_owned())?;
        let target = normalize_token(character);
        let key = characters
            .keys()
            .find(|k| normalize_token(k) == target)
            .cloned()
            .unwrap_or_else(|| character.to_owned());
        let entry = child_object(characters, key)?;
        let block = child_object(entry, side.label().to_ascii_lowercase())?;

        block.insert("scale".into(), Value::from(values.scale));
        block.insert("offset_x".into(), Value::from(values.offset_x));
        block.insert("offset_y".into(), Value::from(values.offset_y));
        for legacy in LEGACY_SIDE_KEYS {
            block.remove(legacy);
        }
        for (flag, on) in [("mirror", values.mirror), ("use_other_side", values.use_other_side)] {
            if on {
                block.insert(flag.into(), Value::Bool(true));
            } else {
                block.remove(flag);
            }
        }

        self.rebuild()?;
        self.dirty.insert(page_key(character, side));
        tracing::debug!(character, side = %side, ?values, "updated working override");
        Ok(())
    }

    /// Cropped and fitted sprite for `character` loaded as `side`, before any override.
    fn sprite(&mut self, character: &str, side: Side) -> ThumbResult<RgbaImage> {
        let key = page_key(character, side);
        if let Some(img) = self.sprites.get(&key) {
            return Ok(img.clone());
        }
        let prepared = load_prepared(
            &self.locator,
            &self.ctx.geom,
            self.set,
            character,
            DEFAULT_COLOR,
            side,
        )?;
        self.sprites.insert(key, prepared.image.clone());
        Ok(prepared.image)
    }

    fn ensure_overlay(&mut self, left: &str, right: &str) -> ThumbResult<(String, String)> {
        let key = (left.to_owned(), right.to_owned());
        if !self.overlays.contains_key(&key) {
            let text = self.ctx.event.def.text.clone().unwrap_or_default();
            let (_, overlay) = render_text(&self.ctx, &mut self.engine, &text, left, right)?;
            self.overlays.insert(key.clone(), overlay);
        }
        Ok(key)
    }

    /// Render `character` on `side` with `values` against the opponent on the other side.
    ///
    /// `values` apply verbatim; the opponent uses its saved override, flags included.
    pub fn render_preview(
        &mut self,
        character: &str,
        side: Side,
        values: SideValues,
    ) -> ThumbResult<Canvas> {
        let edit_source = if values.use_other_side {
            side.opposite()
        } else {
            side
        };
        let edit_img = self.sprite(character, edit_source)?;

        let opp_side = side.opposite();
        let opponent = self.opponent.clone();
        let opp_ov = self.ctx.overrides.resolve(&opponent, opp_side);
        let opp_source = if opp_ov.use_other_side {
            opp_side.opposite()
        } else {
            opp_side
        };
        let opp_img = self.sprite(&opponent, opp_source)?;

        let edit = place_sprite(edit_img, &values.into(), values.mirror, &self.ctx, side);
        let opp = place_sprite(opp_img, &opp_ov, opp_ov.mirror, &self.ctx, opp_side);

        let (left, right, left_name, right_name) = match side {
            Side::Left => (&edit, &opp, character, opponent.as_str()),
            Side::Right => (&opp, &edit, opponent.as_str(), character),
        };
        let key = self.ensure_overlay(left_name, right_name)?;
        let overlay = self
            .overlays
            .get(&key)
            .ok_or_else(|| ThumbError::render("text overlay cache miss"))?;
        compose(&self.ctx.base, left, right, overlay)
    }

    /// [`Self::render_preview`] encoded as JPEG.
    pub fn render_preview_jpeg(
        &mut self,
        character: &str,
        side: Side,
        values: SideValues,
    ) -> ThumbResult<Vec<u8>> {
        let rgb = self.render_preview(character, side, values)?.to_rgb_image()?;
        let mut buf = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, PREVIEW_JPEG_QUALITY)
            .encode_image(&rgb)
            .context("encode preview jpeg")?;
        Ok(buf)
    }

    /// Write the working overrides into the event config and clear the dirty pages.
    pub fn save(&mut self) -> ThumbResult<()> {
        let path = self.ctx.event.path.clone();
        let mut config = read_json_object(&path)?;
        config.insert(OVERRIDES_KEY.into(), Value::Object(self.working.clone()));
        let mut json = serde_json::to_string_pretty(&Value::Object(config.clone()))
            .with_context(|| format!("serialize event config '{}'", path.display()))?;
        json.push('\n');
        std::fs::write(&path, json)
            .with_context(|| format!("write event config '{}'", path.display()))?;

        self.ctx.event = LoadedEvent::from_raw(path, config)?;
        let saved = self.dirty.len();
        self.dirty.clear();
        tracing::info!(path = %self.ctx.event.path.display(), pages = saved, "saved character overrides");
        Ok(())
    }

    /// Discard edits and reload the event config; cached text layers are dropped too.
    pub fn reload(&mut self) -> ThumbResult<()> {
        let event = LoadedEvent::from_path(&self.ctx.event.path)?;
        self.working = working_copy(&event);
        self.ctx.event = event;
        self.rebuild()?;
        self.dirty.clear();
        self.overlays.clear();
        tracing::info!(path = %self.ctx.event.path.display(), "reloaded character overrides");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;

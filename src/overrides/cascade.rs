//! Per-character position and scale overrides.
//!
//! An override set is authored as JSON:
//!
//! ```json
//! {
//!   "defaults": {"scale": 1.0, "offset_x": 0, "offset_y": 0},
//!   "characters": {
//!     "Ganondorf": {"scale": 1.1, "offset_x": 40, "right": {"offset_x": -10, "mirror": true}}
//!   }
//! }
//! ```
//!
//! Resolution merges `defaults -> base -> side`, where each level only overrides the keys it
//! actually sets. A positive base `offset_x` moves a character away from the canvas center, so
//! it is negated for the left side. A side block's `offset_x` is absolute and never flipped.

use crate::config::lenient;
use crate::foundation::core::Side;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::names::normalize_token;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A block of override keys where absence is distinct from an explicit default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialOverride {
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub scale: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub offset_x: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub offset_y: Option<i32>,
    /// Flip the sprite horizontally. Only honored on side blocks.
    #[serde(
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub mirror: Option<bool>,
    /// Load the sprite authored for the opposite side. Only honored on side blocks.
    #[serde(
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_other_side: Option<bool>,
}

impl PartialOverride {
    fn positional(self) -> Self {
        Self {
            mirror: None,
            use_other_side: None,
            ..self
        }
    }
}

/// Fully-populated fallback values applied before any character entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OverrideDefaults {
    pub scale: f64,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for OverrideDefaults {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

/// Overrides for one character.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterOverride {
    /// Keys written at the top level of the character entry.
    pub base: PartialOverride,
    pub left: PartialOverride,
    pub right: PartialOverride,
}

impl CharacterOverride {
    pub fn side(&self, side: Side) -> &PartialOverride {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Effective override for one (character, side).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResolvedOverride {
    pub scale: f64,
    /// Design-space horizontal offset, already sign-adjusted for the side.
    pub offset_x: i32,
    /// Design-space vertical offset; positive moves down.
    pub offset_y: i32,
    pub mirror: bool,
    pub use_other_side: bool,
}

/// Parsed override set, keyed by normalized character name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideSet {
    pub defaults: OverrideDefaults,
    pub characters: BTreeMap<String, CharacterOverride>,
}

impl OverrideSet {
    /// Parse an override payload. `None` yields the empty set.
    pub fn from_value(payload: Option<&Value>) -> ThumbResult<Self> {
        let Some(payload) = payload else {
            return Ok(Self::default());
        };
        let Value::Object(map) = payload else {
            return Err(ThumbError::config("character overrides must be an object"));
        };

        let mut out = Self::default();
        if let Some(defaults) = map.get("defaults").filter(|v| v.is_object()) {
            let p = parse_partial(defaults)?;
            out.defaults = OverrideDefaults {
                scale: p.scale.unwrap_or(1.0),
                offset_x: p.offset_x.unwrap_or(0),
                offset_y: p.offset_y.unwrap_or(0),
            };
        }

        let Some(Value::Object(characters)) = map.get("characters") else {
            return Ok(out);
        };
        for (name, entry) in characters {
            if !entry.is_object() {
                continue;
            }
            let side_block = |key: &str| -> ThumbResult<PartialOverride> {
                match entry.get(key) {
                    Some(v) if v.is_object() => parse_partial(v),
                    _ => Ok(PartialOverride::default()),
                }
            };
            let parsed = CharacterOverride {
                base: parse_partial(entry)?.positional(),
                left: side_block("left")?,
                right: side_block("right")?,
            };
            let key = normalize_token(name);
            if out.characters.insert(key.clone(), parsed).is_some() {
                tracing::warn!(character = %name, key = %key, "duplicate override entry, last one wins");
            }
        }
        Ok(out)
    }

    /// Effective override for `character` on `side`.
    pub fn resolve(&self, character: &str, side: Side) -> ResolvedOverride {
        let d = self.defaults;
        let Some(entry) = self.characters.get(&normalize_token(character)) else {
            return ResolvedOverride {
                scale: d.scale,
                offset_x: apply_center_offset(d.offset_x, side),
                offset_y: d.offset_y,
                mirror: false,
                use_other_side: false,
            };
        };

        let base = entry.base;
        let scale = base.scale.unwrap_or(d.scale);
        let base_offset_x = base.offset_x.unwrap_or(d.offset_x);
        let offset_y = base.offset_y.unwrap_or(d.offset_y);

        let side_block = entry.side(side);
        let offset_x = match side_block.offset_x {
            Some(v) => v,
            None => apply_center_offset(base_offset_x, side),
        };
        ResolvedOverride {
            scale: side_block.scale.unwrap_or(scale),
            offset_x,
            offset_y: side_block.offset_y.unwrap_or(offset_y),
            mirror: side_block.mirror.unwrap_or(false),
            use_other_side: side_block.use_other_side.unwrap_or(false),
        }
    }
}

/// Turn a "distance from center" offset into an absolute one: right keeps its sign, left negates.
pub fn apply_center_offset(offset_x: i32, side: Side) -> i32 {
    match side {
        Side::Right => offset_x,
        Side::Left => offset_x.saturating_neg(),
    }
}

fn parse_partial(v: &Value) -> ThumbResult<PartialOverride> {
    serde_json::from_value(v.clone())
        .map_err(|e| ThumbError::serde(format!("parse override block: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/overrides/cascade.rs"]
mod tests;

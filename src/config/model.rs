use crate::config::lenient;
use serde::{Deserialize, Serialize};

/// `configs/main.json`: which event is active and where its config lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfigDef {
    /// Id of the active event.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub current_event: Option<String>,
    /// Known events; entries that are not objects are ignored by the resolver.
    #[serde(default, deserialize_with = "opt_array")]
    pub events: Option<Vec<serde_json::Value>>,
}

/// One entry of [`MainConfigDef::events`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntryDef {
    /// Event id matched against `current_event`.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    /// Path of the event config, relative to the project root.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub config_path: Option<String>,
}

/// Per-event configuration consumed by the composition engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventConfigDef {
    /// Base canvas image.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub base_image: Option<String>,
    /// Text blocks.
    #[serde(default)]
    pub text: Option<TextConfigDef>,
    /// Inline override set; takes precedence over `character_overrides_path`.
    #[serde(default)]
    pub character_overrides: Option<serde_json::Value>,
    /// External override set file.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub character_overrides_path: Option<String>,
    /// Sprite outline settings.
    #[serde(default)]
    pub character_outline: Option<serde_json::Value>,
}

/// The `text` object of an event config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextConfigDef {
    #[serde(default, deserialize_with = "opt_block")]
    pub event_title: Option<TextBlockDef>,
    #[serde(default, deserialize_with = "opt_block")]
    pub event_number: Option<TextBlockDef>,
    #[serde(default, deserialize_with = "opt_block")]
    pub round_title: Option<TextBlockDef>,
    #[serde(default, deserialize_with = "opt_block")]
    pub vs_logo: Option<TextBlockDef>,
    #[serde(default, deserialize_with = "opt_block")]
    pub player_names: Option<TextBlockDef>,
}

/// A text block exactly as written in configuration; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlockDef {
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_object_list")]
    pub segments: Option<Vec<SegmentDef>>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub font_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub min_size: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub max_size: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub max_width: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub max_lines: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub line_spacing: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub align: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub anchor: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub fill: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stroke_fill: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub stroke_width: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub x: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub y: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub stack: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub stack_gap: Option<i32>,
    /// Player names only: inward padding from each canvas edge.
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub x_padding: Option<i32>,
    /// Player names only: half-gap around the canvas center line.
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub center_gap: Option<i32>,
}

impl TextBlockDef {
    /// Blocks are enabled unless `enabled` is explicitly falsy.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Trimmed text of an enabled block, empty otherwise.
    pub fn enabled_text(&self) -> String {
        if !self.is_enabled() {
            return String::new();
        }
        self.text.as_deref().unwrap_or("").trim().to_owned()
    }
}

/// One styled piece of a segmented text block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentDef {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub size_scale: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub font_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub x_adjust: Option<i32>,
}

/// `character_outline` as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineDef {
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub size: Option<i32>,
    #[serde(default)]
    pub color: Option<serde_json::Value>,
}

/// A non-object block value is treated as a missing block.
fn opt_block<'de, D>(deserializer: D) -> Result<Option<TextBlockDef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    if !v.is_object() {
        return Ok(None);
    }
    serde_json::from_value(v)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn opt_array<'de, D>(deserializer: D) -> Result<Option<Vec<serde_json::Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(Some(items)),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;

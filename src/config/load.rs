use crate::config::model::{EventConfigDef, EventEntryDef, MainConfigDef};
use crate::foundation::error::{ThumbError, ThumbResult};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Location of the main config, relative to the project root.
pub const MAIN_CONFIG_PATH: &str = "configs/main.json";

/// Resolve a configured path against the project root.
///
/// Empty values resolve to `None`. A leading `~/` expands to `$HOME`; absolute paths are kept.
pub fn resolve_path(root: &Path, value: Option<&str>) -> Option<PathBuf> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let path = match value.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(value),
        },
        None => PathBuf::from(value),
    };
    if path.is_absolute() {
        Some(path)
    } else {
        Some(root.join(path))
    }
}

/// Read a JSON file whose top-level value must be an object.
pub fn read_json_object(path: &Path) -> ThumbResult<Map<String, Value>> {
    let f = File::open(path)
        .map_err(|e| ThumbError::config(format!("open JSON file '{}': {e}", path.display())))?;
    let v: Value = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| ThumbError::serde(format!("invalid JSON file '{}': {e}", path.display())))?;
    match v {
        Value::Object(map) => Ok(map),
        _ => Err(ThumbError::config(format!(
            "JSON file must be an object: '{}'",
            path.display()
        ))),
    }
}

/// Load `configs/main.json` under `root`.
pub fn load_main_config(root: &Path) -> ThumbResult<MainConfigDef> {
    let path = root.join(MAIN_CONFIG_PATH);
    if !path.is_file() {
        return Err(ThumbError::config(format!(
            "main config not found: '{}'",
            path.display()
        )));
    }
    let map = read_json_object(&path)?;
    let def: MainConfigDef = serde_json::from_value(Value::Object(map))
        .map_err(|e| ThumbError::serde(format!("parse main config: {e}")))?;
    let has_current = def.current_event.as_deref().is_some_and(|s| !s.is_empty());
    if !has_current || def.events.is_none() {
        return Err(ThumbError::config(
            "main config must include current_event and events list",
        ));
    }
    Ok(def)
}

/// An event config as loaded from disk: its path, the raw object, and the typed view.
#[derive(Debug, Clone)]
pub struct LoadedEvent {
    /// Absolute path of the event config file.
    pub path: PathBuf,
    /// The untouched JSON object; edits are written back through this.
    pub raw: Map<String, Value>,
    /// Typed view of `raw`.
    pub def: EventConfigDef,
}

impl LoadedEvent {
    /// Load an event config file directly.
    pub fn from_path(path: impl AsRef<Path>) -> ThumbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = read_json_object(&path)?;
        Self::from_raw(path, raw)
    }

    pub(crate) fn from_raw(path: PathBuf, raw: Map<String, Value>) -> ThumbResult<Self> {
        let def: EventConfigDef = serde_json::from_value(Value::Object(raw.clone())).map_err(|e| {
            ThumbError::serde(format!("parse event config '{}': {e}", path.display()))
        })?;
        Ok(Self { path, raw, def })
    }

    /// The override payload this event uses.
    ///
    /// An inline `character_overrides` key wins even when its value is `null`; otherwise the file
    /// named by `character_overrides_path` is read. A missing override file is not fatal.
    pub fn override_payload(&self, root: &Path) -> ThumbResult<Option<Value>> {
        if let Some(inline) = self.raw.get("character_overrides") {
            return Ok(Some(inline.clone()).filter(|v| !v.is_null()));
        }
        let Some(path) = resolve_path(root, self.def.character_overrides_path.as_deref()) else {
            return Ok(None);
        };
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "character overrides file not found");
            return Ok(None);
        }
        Ok(Some(Value::Object(read_json_object(&path)?)))
    }
}

/// Find and load the event config named by `main.current_event`.
pub fn resolve_event_config(root: &Path, main: &MainConfigDef) -> ThumbResult<LoadedEvent> {
    let current = main.current_event.as_deref().unwrap_or("");
    for entry in main.events.iter().flatten() {
        if !entry.is_object() {
            continue;
        }
        let entry: EventEntryDef = serde_json::from_value(entry.clone())
            .map_err(|e| ThumbError::serde(format!("parse event entry: {e}")))?;
        if entry.id.as_deref() != Some(current) {
            continue;
        }
        let Some(path) = resolve_path(root, entry.config_path.as_deref()) else {
            return Err(ThumbError::config(format!(
                "event config path missing for event '{current}'"
            )));
        };
        if !path.is_file() {
            return Err(ThumbError::config(format!(
                "event config not found: '{}'",
                path.display()
            )));
        }
        tracing::debug!(event = current, path = %path.display(), "resolved event config");
        return LoadedEvent::from_path(path);
    }
    Err(ThumbError::config(format!(
        "current_event '{current}' not found in main config"
    )))
}

/// Load the current event config of the project at `root`.
pub fn load_current_event(root: &Path) -> ThumbResult<LoadedEvent> {
    let main = load_main_config(root)?;
    resolve_event_config(root, &main)
}

#[cfg(test)]
#[path = "../../tests/unit/config/load.rs"]
mod tests;

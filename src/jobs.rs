//! Render jobs as the command line runs them: one-off renders, JSON quick configs and batches.

use crate::assets::locator::{AssetLocator, AssetSet, available_colors};
use crate::config::load::{load_current_event, read_json_object, resolve_path};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::names::{normalize_token, slugify};
use crate::render::compositor::{
    DEFAULT_BASE_IMAGE, DEFAULT_CHARACTER_DIR, DEFAULT_COLOR, EventContext, ThumbnailRequest,
    effective_text, render_thumbnail,
};
use crate::render::output::{DEFAULT_OUTPUT_DIR, SavedThumbnail, save_thumbnail, thumbnail_slug};
use crate::text::engine::TextEngine;
use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Keys every quick config and batch set must carry.
pub const REQUIRED_KEYS: [&str; 5] = ["p1_character", "p2_character", "player1", "player2", "round"];
/// Batch output directories are `<output_root>/set_thumbnail_test_<N>`.
pub const BATCH_DIR_PREFIX: &str = "set_thumbnail_test_";
pub const DEFAULT_BATCH_ROOT: &str = "output";
/// Character a roster sweep pairs with everyone when it names none.
pub const DEFAULT_ANCHOR_CHARACTER: &str = "Fox";

/// A request plus where its output goes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderJob {
    #[serde(flatten)]
    pub request: ThumbnailRequest,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub character_dir: Option<String>,
    #[serde(default)]
    pub base_image: Option<String>,
    #[serde(default)]
    pub metadata: bool,
}

impl RenderJob {
    pub fn new(request: ThumbnailRequest) -> Self {
        Self {
            request,
            slug: None,
            output_dir: None,
            character_dir: None,
            base_image: None,
            metadata: false,
        }
    }

    /// Parse a job object. `require_values` also rejects empty required values.
    pub fn from_object(obj: &Map<String, Value>, require_values: bool) -> ThumbResult<Self> {
        let missing = missing_keys(obj, require_values);
        if !missing.is_empty() {
            return Err(ThumbError::config(format!(
                "missing keys: {}",
                missing.join(", ")
            )));
        }
        let mut job: Self = serde_json::from_value(Value::Object(obj.clone()))
            .map_err(|e| ThumbError::serde(format!("parse render job: {e}")))?;
        for color in [&mut job.request.p1_color, &mut job.request.p2_color] {
            if color.trim().is_empty() {
                *color = DEFAULT_COLOR.to_owned();
            }
        }
        Ok(job)
    }
}

/// Sorted names from [`REQUIRED_KEYS`] absent from `obj` (or empty, with `require_values`).
pub fn missing_keys(obj: &Map<String, Value>, require_values: bool) -> Vec<&'static str> {
    REQUIRED_KEYS
        .into_iter()
        .filter(|k| match obj.get(*k) {
            None => true,
            Some(v) if require_values => match v {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Bool(b) => !b,
                _ => false,
            },
            Some(_) => false,
        })
        .collect()
}

/// Load a quick-render config file.
pub fn load_quick_job(root: &Path, config: &Path) -> ThumbResult<RenderJob> {
    let path = if config.is_absolute() {
        config.to_path_buf()
    } else {
        root.join(config)
    };
    if !path.is_file() {
        return Err(ThumbError::config(format!(
            "config file not found: '{}'",
            path.display()
        )));
    }
    RenderJob::from_object(&read_json_object(&path)?, true)
        .map_err(|e| ThumbError::config(format!("'{}': {e}", path.display())))
}

/// Render `job` against the current event of `root` and write its files.
pub fn run_job(root: &Path, job: &RenderJob, engine: &mut TextEngine) -> ThumbResult<SavedThumbnail> {
    let event = load_current_event(root)?;
    let fallback = job.base_image.as_deref().unwrap_or(DEFAULT_BASE_IMAGE);
    let ctx = EventContext::load(root, event, Some(fallback))?;

    let character_dir = PathBuf::from(job.character_dir.as_deref().unwrap_or(DEFAULT_CHARACTER_DIR));
    let thumb = render_thumbnail(&ctx, engine, &character_dir, &job.request)?;

    let slug = match job.slug.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s.to_owned(),
        None => thumbnail_slug(&job.request, &effective_text(&ctx, &job.request.round)?),
    };
    let out_dir = resolve_path(root, Some(job.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)))
        .ok_or_else(|| ThumbError::config("output directory is empty"))?;
    save_thumbnail(&thumb, &job.request, &out_dir, &slug, job.metadata)
}

/// First unused `set_thumbnail_test_<N>` under `output_root`, N = highest existing + 1.
pub fn next_batch_dir(output_root: &Path) -> PathBuf {
    let highest = std::fs::read_dir(output_root)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let n = name.strip_prefix(BATCH_DIR_PREFIX)?;
            (!n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                .then(|| n.parse::<u64>().ok())
                .flatten()
        })
        .max()
        .unwrap_or(0);
    output_root.join(format!("{BATCH_DIR_PREFIX}{}", highest + 1))
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub rendered: Vec<PathBuf>,
    pub failures: usize,
}

/// A random sweep of one anchor character against a whole roster.
///
/// Every roster entry is rendered twice, once on each side of the anchor, with a random round
/// and random available colors. A seed makes the sweep repeatable.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RosterSweep {
    pub rounds: Vec<String>,
    pub anchor_character: Option<String>,
    /// Roster to pair with the anchor; every character directory of the set when absent.
    pub characters: Option<Vec<String>>,
    pub character_set: AssetSet,
    pub character_dir: Option<String>,
    pub seed: Option<u64>,
}

fn pick(rng: &mut StdRng, items: &[String]) -> String {
    items.choose(rng).cloned().unwrap_or_default()
}

impl RosterSweep {
    /// Expand the sweep into set objects. `seed` takes precedence over the sweep's own seed.
    pub fn build_sets(&self, root: &Path, seed: Option<u64>) -> ThumbResult<Vec<Value>> {
        if self.rounds.is_empty() {
            return Err(ThumbError::config("roster sweep needs at least one round"));
        }
        let character_dir = self
            .character_dir
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHARACTER_DIR);
        let set_root = resolve_path(root, Some(character_dir))
            .ok_or_else(|| ThumbError::config("character directory is empty"))?
            .join(self.character_set.dir_name());
        if !set_root.is_dir() {
            return Err(ThumbError::asset_not_found(format!(
                "character set directory missing: '{}'",
                set_root.display()
            )));
        }

        let characters = match &self.characters {
            Some(list) => list.clone(),
            None => AssetLocator::new(&set_root).characters()?,
        };
        if characters.is_empty() {
            return Err(ThumbError::asset_not_found(format!(
                "no characters found in '{}'",
                set_root.display()
            )));
        }
        let mut colors: HashMap<&str, Vec<String>> = HashMap::with_capacity(characters.len());
        for character in &characters {
            let dir = set_root.join(character);
            if !dir.is_dir() {
                return Err(ThumbError::asset_not_found(format!(
                    "character directory missing: '{}'",
                    dir.display()
                )));
            }
            let mut available = available_colors(&dir, self.character_set);
            if available.is_empty() {
                available.push(DEFAULT_COLOR.to_owned());
            }
            colors.insert(character.as_str(), available);
        }

        let requested = self
            .anchor_character
            .as_deref()
            .unwrap_or(DEFAULT_ANCHOR_CHARACTER);
        let target = normalize_token(requested);
        let anchor = characters
            .iter()
            .find(|c| normalize_token(c) == target)
            .ok_or_else(|| {
                ThumbError::config(format!(
                    "anchor character '{requested}' not found in character pool"
                ))
            })?;

        let mut rng = match seed.or(self.seed) {
            Some(seed) => {
                tracing::info!(seed, "seeding roster sweep");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        let anchor_slug = slugify(anchor);
        let mut sets = Vec::with_capacity(characters.len() * 2);
        for character in &characters {
            let character_slug = slugify(character);
            for (left, right, slug) in [
                (anchor, character, format!("left_{anchor_slug}_right_{character_slug}")),
                (character, anchor, format!("right_{anchor_slug}_left_{character_slug}")),
            ] {
                let round = pick(&mut rng, &self.rounds);
                let p1_color = pick(&mut rng, &colors[left.as_str()]);
                let p2_color = pick(&mut rng, &colors[right.as_str()]);
                sets.push(json!({
                    "round": round,
                    "player1": left,
                    "player2": right,
                    "p1_character": left,
                    "p2_character": right,
                    "p1_color": p1_color,
                    "p2_color": p2_color,
                    "slug": slug,
                    "character_set": self.character_set,
                    "character_dir": character_dir,
                }));
            }
        }
        tracing::info!(anchor = %anchor, sets = sets.len(), "built roster sweep");
        Ok(sets)
    }
}

/// Read a batch file and return its sets, truncated to `limit`.
///
/// The file is either a JSON array of set objects or a [`RosterSweep`] object, which is
/// expanded against `root` using `seed` when given.
pub fn load_batch_sets(
    root: &Path,
    path: &Path,
    limit: Option<usize>,
    seed: Option<u64>,
) -> ThumbResult<Vec<Value>> {
    if !path.is_file() {
        return Err(ThumbError::config(format!(
            "sets file not found: '{}'",
            path.display()
        )));
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read sets '{}'", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| ThumbError::serde(format!("invalid JSON in '{}': {e}", path.display())))?;
    let mut sets = match value {
        Value::Array(sets) => sets,
        Value::Object(_) => {
            let sweep: RosterSweep = serde_json::from_value(value)
                .map_err(|e| ThumbError::serde(format!("parse roster sweep: {e}")))?;
            sweep.build_sets(root, seed)?
        }
        _ => {
            return Err(ThumbError::config(
                "sets file must be a JSON array of set objects or a roster sweep object",
            ));
        }
    };
    if let Some(limit) = limit.filter(|n| *n > 0) {
        sets.truncate(limit);
    }
    Ok(sets)
}

/// Render every set into a fresh batch directory.
///
/// Each set is independent: a failing set is logged and counted, and the batch continues.
pub fn run_batch(
    root: &Path,
    sets: &[Value],
    output_root: &Path,
    engine: &mut TextEngine,
) -> ThumbResult<BatchReport> {
    let output_dir = next_batch_dir(output_root);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create batch dir '{}'", output_dir.display()))?;
    tracing::info!(dir = %output_dir.display(), sets = sets.len(), "writing batch thumbnails");

    let mut report = BatchReport {
        output_dir,
        ..Default::default()
    };
    for (i, entry) in sets.iter().enumerate() {
        let index = i + 1;
        let result = match entry {
            Value::Object(obj) => RenderJob::from_object(obj, false).and_then(|mut job| {
                job.output_dir = Some(report.output_dir.to_string_lossy().into_owned());
                run_job(root, &job, engine)
            }),
            _ => Err(ThumbError::config("set must be an object")),
        };
        match result {
            Ok(saved) => report.rendered.push(saved.image),
            Err(e) => {
                tracing::error!(set = index, error = %e, "batch set failed");
                report.failures += 1;
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../tests/unit/jobs.rs"]
mod tests;

//! Sprite lookup for a (character, color, side).
//!
//! Character directories and sprite files are matched first by exact name and then by their
//! [`normalize_token`] form, so `"Mr. Game & Watch"` finds `mr_game_and_watch/`. The requested
//! color falls back to `Default`. In the mirrored-pair set each color ships as `"<color> Left"`
//! and `"<color> Right"`; a missing or visibly undersized right asset is replaced by the left one
//! drawn mirrored.

use crate::assets::decode::load_sprite;
use crate::foundation::core::Side;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::foundation::names::normalize_token;
use crate::sprite::transform::{crop_to_opaque, fitted_height};
use std::path::{Path, PathBuf};

/// A right asset whose fitted height is below this fraction of the left one is treated as bad.
pub const RIGHT_SIDE_HEIGHT_RATIO: f64 = 0.9;

/// Sprite collection layout under `<character_dir>/<set>/`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSet {
    /// `"<color> Left.png"` / `"<color> Right.png"` pairs.
    #[default]
    VsScreen,
    /// One `"<color>.png"` per color.
    Portraits,
    /// One `"<color>.png"` per color.
    StockIcons,
}

impl AssetSet {
    /// Directory name of the set.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::VsScreen => "vs_screen",
            Self::Portraits => "portraits",
            Self::StockIcons => "stock_icons",
        }
    }

    pub fn parse(s: &str) -> ThumbResult<Self> {
        match s.trim() {
            "vs_screen" => Ok(Self::VsScreen),
            "portraits" => Ok(Self::Portraits),
            "stock_icons" => Ok(Self::StockIcons),
            other => Err(ThumbError::config(format!(
                "character set must be vs_screen, portraits or stock_icons, got '{other}'"
            ))),
        }
    }

    fn is_mirrored_pair(self) -> bool {
        matches!(self, Self::VsScreen)
    }
}

impl std::fmt::Display for AssetSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Resolved sprite file for one side of the canvas.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CharacterImage {
    pub path: PathBuf,
    /// The file must be flipped horizontally before use.
    pub mirror: bool,
    /// Color variant actually used; differs from the request after a fallback.
    pub color: String,
}

/// Asset-quality rules applied during lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatorRules {
    /// Characters whose right side always uses the mirrored left asset.
    pub forced_mirror_right: Vec<String>,
}

impl Default for LocatorRules {
    fn default() -> Self {
        Self {
            forced_mirror_right: vec!["roy".to_owned()],
        }
    }
}

impl LocatorRules {
    fn forces_mirror(&self, character: &str) -> bool {
        let key = normalize_token(character);
        self.forced_mirror_right
            .iter()
            .any(|c| normalize_token(c) == key)
    }
}

/// One lookup request.
#[derive(Clone, Copy, Debug)]
pub struct AssetQuery<'a> {
    pub character: &'a str,
    pub color: &'a str,
    pub side: Side,
    pub set: AssetSet,
    /// Fit box used by the right-side height test; `None` skips the test.
    pub fit_box: Option<(u32, u32)>,
}

fn sorted_dir_entries(dir: &Path) -> ThumbResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir).map_err(|e| {
        ThumbError::asset_not_found(format!("read directory '{}': {e}", dir.display()))
    })?;
    let mut out: Vec<PathBuf> = rd.filter_map(|e| e.ok().map(|e| e.path())).collect();
    out.sort();
    Ok(out)
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(p: &Path) -> String {
    p.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_png(p: &Path) -> bool {
    p.is_file()
        && p
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case("png"))
}

/// Directory of `character` under `root`, exact name first then normalized match.
pub fn resolve_character_dir(root: &Path, character: &str) -> ThumbResult<PathBuf> {
    let exact = root.join(character);
    if !character.is_empty() && exact.is_dir() {
        return Ok(exact);
    }

    let target = normalize_token(character);
    let dirs: Vec<PathBuf> = sorted_dir_entries(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    let matches: Vec<&PathBuf> = dirs
        .iter()
        .filter(|p| normalize_token(&file_name(p)) == target)
        .collect();
    if let Some(first) = matches.first() {
        if matches.len() > 1 {
            tracing::warn!(
                character,
                chosen = %file_name(first),
                candidates = matches.len(),
                "ambiguous character directory, using first match"
            );
        }
        return Ok((*first).clone());
    }

    let available: Vec<String> = dirs.iter().map(|p| file_name(p)).collect();
    Err(ThumbError::asset_not_found(format!(
        "unknown character '{character}'. Available: {}",
        available.join(", ")
    )))
}

/// `<stem>.png` in `dir`, exact first then the first normalized match among sorted `*.png`.
pub fn find_image_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    let direct = dir.join(format!("{stem}.png"));
    if direct.is_file() {
        return Some(direct);
    }
    let target = normalize_token(stem);
    sorted_dir_entries(dir)
        .ok()?
        .into_iter()
        .filter(|p| is_png(p))
        .find(|p| normalize_token(&file_stem(p)) == target)
}

/// Colors available in a mirrored-pair directory (stems ending in ` Left`/` Right`).
pub fn available_pair_colors(dir: &Path) -> Vec<String> {
    let mut colors: Vec<String> = sorted_dir_entries(dir)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| is_png(p))
        .filter_map(|p| {
            let stem = file_stem(&p);
            stem.strip_suffix(" Left")
                .or_else(|| stem.strip_suffix(" Right"))
                .map(str::to_owned)
        })
        .collect();
    colors.sort();
    colors.dedup();
    colors
}

/// Colors a character directory of `set` offers.
pub fn available_colors(dir: &Path, set: AssetSet) -> Vec<String> {
    match set {
        AssetSet::VsScreen => available_pair_colors(dir),
        AssetSet::Portraits | AssetSet::StockIcons => available_single_colors(dir),
    }
}

/// Stems of every `*.png` in a single-image directory.
pub fn available_single_colors(dir: &Path) -> Vec<String> {
    let mut colors: Vec<String> = sorted_dir_entries(dir)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| is_png(p))
        .map(|p| file_stem(&p))
        .collect();
    colors.sort();
    colors
}

/// True when the right asset is undersized relative to the left one.
pub fn right_is_defective(right_height: f64, left_height: f64) -> bool {
    right_height < left_height * RIGHT_SIDE_HEIGHT_RATIO
}

fn probe_fitted_height(path: &Path, fit_box: (u32, u32)) -> ThumbResult<f64> {
    let img = crop_to_opaque(load_sprite(path, false)?);
    Ok(fitted_height(&img, fit_box.0 as i32, fit_box.1 as i32))
}

fn color_candidates(color: &str) -> Vec<&str> {
    let mut out = vec![color];
    if normalize_token(color) != "default" {
        out.push("Default");
    }
    out
}

fn warn_substituted(q: &AssetQuery<'_>, used: &str) {
    if normalize_token(used) != normalize_token(q.color) {
        tracing::warn!(
            character = q.character,
            side = %q.side,
            requested = q.color,
            using = used,
            "color not found, substituting"
        );
    }
}

/// Finds sprite files under one asset-set root (e.g. `assets/characters/vs_screen`).
#[derive(Clone, Debug)]
pub struct AssetLocator {
    root: PathBuf,
    rules: LocatorRules,
}

impl AssetLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: LocatorRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: LocatorRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted character directory names.
    pub fn characters(&self) -> ThumbResult<Vec<String>> {
        Ok(sorted_dir_entries(&self.root)?
            .into_iter()
            .filter(|p| p.is_dir())
            .map(|p| file_name(&p))
            .collect())
    }

    /// Resolve the sprite for `q`.
    pub fn resolve(&self, q: &AssetQuery<'_>) -> ThumbResult<CharacterImage> {
        let dir = resolve_character_dir(&self.root, q.character)?;
        let candidates = color_candidates(q.color);
        let found = if q.set.is_mirrored_pair() {
            self.resolve_pair(q, &dir, &candidates)?
        } else {
            candidates.iter().find_map(|c| {
                find_image_file(&dir, c).map(|path| CharacterImage {
                    path,
                    mirror: false,
                    color: (*c).to_owned(),
                })
            })
        };

        match found {
            Some(img) => {
                warn_substituted(q, &img.color);
                tracing::debug!(
                    character = q.character,
                    side = %q.side,
                    path = %img.path.display(),
                    mirror = img.mirror,
                    "resolved character image"
                );
                Ok(img)
            }
            None => {
                let available = if q.set.is_mirrored_pair() {
                    available_pair_colors(&dir)
                } else {
                    available_single_colors(&dir)
                };
                let wanted = if q.set.is_mirrored_pair() {
                    format!("{} {}", q.color, q.side)
                } else {
                    q.color.to_owned()
                };
                Err(ThumbError::asset_not_found(format!(
                    "missing image for {} ({wanted}) in '{}'. Available colors: {}",
                    q.character,
                    dir.display(),
                    available.join(", ")
                )))
            }
        }
    }

    fn resolve_pair(
        &self,
        q: &AssetQuery<'_>,
        dir: &Path,
        candidates: &[&str],
    ) -> ThumbResult<Option<CharacterImage>> {
        let pick = |path: PathBuf, mirror: bool, color: &str| CharacterImage {
            path,
            mirror,
            color: color.to_owned(),
        };

        if q.side == Side::Right && self.rules.forces_mirror(q.character) {
            for c in candidates {
                if let Some(left) = find_image_file(dir, &format!("{c} Left")) {
                    tracing::warn!(
                        character = q.character,
                        "right side forced to mirrored left asset"
                    );
                    return Ok(Some(pick(left, true, c)));
                }
            }
        }

        for c in candidates {
            let left = find_image_file(dir, &format!("{c} Left"));
            if q.side == Side::Left {
                if let Some(left) = left {
                    return Ok(Some(pick(left, false, c)));
                }
                continue;
            }

            let right = find_image_file(dir, &format!("{c} Right"));
            if let (Some(r), Some(l), Some(fit_box)) = (&right, &left, q.fit_box) {
                let rh = probe_fitted_height(r, fit_box)?;
                let lh = probe_fitted_height(l, fit_box)?;
                if right_is_defective(rh, lh) {
                    tracing::warn!(
                        character = q.character,
                        color = c,
                        right_height = rh,
                        left_height = lh,
                        "right asset is smaller than left, using left mirrored"
                    );
                    return Ok(Some(pick(l.clone(), true, c)));
                }
            }
            if let Some(r) = right {
                return Ok(Some(pick(r, false, c)));
            }
            if let Some(l) = left {
                tracing::warn!(
                    character = q.character,
                    color = c,
                    "right asset missing, using left mirrored"
                );
                return Ok(Some(pick(l, true, c)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/locator.rs"]
mod tests;

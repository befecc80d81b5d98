/// Normalize a character, color or file stem for fuzzy matching.
///
/// Lowercases, spells out `&` as `and`, and drops every non-alphanumeric character, so
/// `"Mr. Game & Watch"` and `"mr_game_and_watch"` compare equal.
pub fn normalize_token(text: &str) -> String {
    text.to_lowercase()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Build a filesystem-friendly slug from free text.
///
/// Non-ASCII characters are dropped, runs of anything outside `[a-z0-9]` collapse to a single
/// `_`, and an empty result becomes `"thumbnail"`.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for ch in lowered.chars().filter(char::is_ascii) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "thumbnail".to_owned()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/names.rs"]
mod tests;

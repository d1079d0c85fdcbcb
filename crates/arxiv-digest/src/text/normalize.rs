//! Canonical form used for fuzzy title comparison.

use std::sync::LazyLock;

use regex::Regex;

static HYPHEN_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-\s*").expect("hyphen pattern is valid"));

/// Normalize text for case, whitespace and punctuation insensitive comparison.
///
/// Lower-cases, drops everything except alphanumerics, whitespace and hyphens,
/// collapses whitespace, glues hyphens to their neighbours and trims. The result
/// is a fixed point: normalizing it again returns it unchanged.
#[must_use]
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    HYPHEN_SPACING.replace_all(&collapsed, "-").trim().to_string()
}

/// Returns true if `needle` occurs in `haystack` bounded by non-word characters.
///
/// Both arguments are expected to be normalized already.
#[must_use]
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

/// Word characters in the sense of regex `\w`.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

//! Author-year citation extraction.
//!
//! Citations are found by a small ordered rule table. Each rule is matched over the
//! whole text on its own, so a single reference can be reported by more than one
//! rule (`Lee and Kim (2023)` also contains `Kim (2023)`). Overlaps are resolved by
//! the link annotator, not here.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::Citation;

/// A citation surface form and how to derive its author key.
struct CitationRule {
    name: &'static str,
    pattern: Regex,
    author_key: fn(&Captures<'_>) -> String,
}

static RULES: LazyLock<Vec<CitationRule>> = LazyLock::new(|| {
    vec![
        CitationRule {
            name: "et-al",
            pattern: Regex::new(r"\b([A-Z][a-z]+)\s+et\s+al\.\s*\((\d{4})\)")
                .expect("et al. pattern is valid"),
            author_key: |caps| caps[1].to_string(),
        },
        CitationRule {
            name: "two-authors",
            pattern: Regex::new(r"\b([A-Z][a-z]+)\s+and\s+([A-Z][a-z]+)\s*\((\d{4})\)")
                .expect("two-author pattern is valid"),
            author_key: |caps| format!("{} and {}", &caps[1], &caps[2]),
        },
        CitationRule {
            name: "single-author",
            pattern: Regex::new(r"\b([A-Z][a-z]+)\s*\((\d{4})\)")
                .expect("single-author pattern is valid"),
            author_key: |caps| caps[1].to_string(),
        },
    ]
});

/// Find every author-year citation in `text`, ordered by position.
///
/// Matches from different rules at the same position keep rule order, so the more
/// specific form comes first.
#[must_use]
pub fn find_citations(text: &str) -> Vec<Citation> {
    let mut found: Vec<Citation> = Vec::new();

    for rule in RULES.iter() {
        for caps in rule.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            // the year is always the last capture group
            let last = caps.iter().flatten().last();
            let Some(Ok(year)) = last.map(|m| m.as_str().parse()) else {
                continue;
            };

            tracing::trace!(
                rule = rule.name,
                matched = whole.as_str(),
                "Citation candidate"
            );
            found.push(Citation {
                author_key: (rule.author_key)(&caps),
                year,
                matched: whole.as_str().to_string(),
                span: whole.range(),
            });
        }
    }

    found.sort_by_key(|c| c.span.start);
    found
}

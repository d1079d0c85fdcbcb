//! Picking paper titles out of a ranked LLM answer.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PaperRecord;

static RANKED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s\*\*(.*?)\*\*").expect("ranked title pattern is valid"));

/// Titles from numbered entries shaped like `1. **Title** - reasoning`, in order.
#[must_use]
pub fn extract_ranked_titles(content: &str) -> Vec<String> {
    RANKED_TITLE
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

/// Papers whose title matches one of `titles`, ignoring whitespace differences.
///
/// Input order of `papers` is kept.
#[must_use]
pub fn select_papers_by_titles<'a>(
    papers: &'a [PaperRecord],
    titles: &[String],
) -> Vec<&'a PaperRecord> {
    let wanted: Vec<String> = titles.iter().map(|t| collapse_whitespace(t)).collect();

    papers
        .iter()
        .filter(|paper| wanted.contains(&collapse_whitespace(paper.title())))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

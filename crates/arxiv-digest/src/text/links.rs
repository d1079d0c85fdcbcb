//! Hyperlinking of paper titles and author-year citations in generated prose.
//!
//! Annotation runs two passes over one working buffer: titles first, then
//! citations. Spans already wrapped in an anchor are never rewritten, which keeps a
//! short title from being linked inside a longer one and keeps citations that sit
//! inside a linked title intact. Feeding already annotated text back in is not
//! supported.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::citations::find_citations;
use super::normalize::{contains_phrase, is_word_char, normalize};
use crate::models::PaperRecord;

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<a\s[^>]*>.*?</a>").expect("anchor pattern is valid")
});

/// Wrap `text` in a link to `url` that opens in a new tab.
#[must_use]
pub fn anchor(url: &str, text: &str) -> String {
    format!(r#"<a href="{url}" target="_blank">{text}</a>"#)
}

/// Link paper titles, then citations, in `text`.
#[must_use]
pub fn annotate(text: &str, papers: &[PaperRecord]) -> String {
    let titled = link_titles(text, papers);
    link_citations(&titled, papers)
}

/// Wrap every mention of a paper title in a link to that paper.
///
/// Titles are tried longest first (by normalized length). A title is only
/// considered when its normalized form appears as whole words in the normalized
/// text; occurrences are then matched case-insensitively with flexible whitespace.
/// The linked text is the occurrence as written, casing and line breaks included.
#[must_use]
pub fn link_titles(text: &str, papers: &[PaperRecord]) -> String {
    let normalized_text = normalize(text);

    let mut candidates: Vec<(&PaperRecord, String)> = papers
        .iter()
        .map(|paper| (paper, normalize(paper.title())))
        .filter(|(_, title)| !title.is_empty())
        .collect();
    candidates.sort_by_key(|(_, title)| std::cmp::Reverse(title.chars().count()));

    let mut working = text.to_string();
    let mut linked = 0usize;

    for (paper, normalized_title) in candidates {
        if !contains_phrase(&normalized_text, &normalized_title) {
            continue;
        }
        let Some(matcher) = TitleMatcher::new(paper.title()) else {
            continue;
        };

        let spans = matcher.find_unlinked(&working);
        if spans.is_empty() {
            tracing::debug!(
                title = paper.title(),
                "Normalized title found but no literal occurrence"
            );
            continue;
        }

        let edits: Vec<(Range<usize>, String)> = spans
            .into_iter()
            .map(|span| {
                let link = anchor(paper.url(), &working[span.clone()]);
                (span, link)
            })
            .collect();
        linked += edits.len();
        working = splice(&working, &edits);
    }

    tracing::debug!(count = linked, "Linked title mentions");
    working
}

/// Wrap citations that resolve to exactly one paper in a link to it.
///
/// A citation resolves to a paper when the years agree and every cited surname is
/// one of the paper's author surnames. Unknown and ambiguous citations stay as
/// plain text.
#[must_use]
pub fn link_citations(text: &str, papers: &[PaperRecord]) -> String {
    let protected = anchor_spans(text);
    let index: Vec<(&PaperRecord, Option<i32>, Vec<&str>)> = papers
        .iter()
        .map(|paper| (paper, paper.publication_year(), paper.author_surnames()))
        .collect();

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for citation in find_citations(text) {
        if overlaps_any(&citation.span, protected.iter())
            || overlaps_any(&citation.span, edits.iter().map(|(span, _)| span))
        {
            continue;
        }

        let surnames = citation.surnames();
        let mut resolved = index.iter().filter(|(_, year, authors)| {
            *year == Some(citation.year) && surnames.iter().all(|s| authors.contains(s))
        });

        match (resolved.next(), resolved.next()) {
            (Some((paper, _, _)), None) => {
                edits.push((citation.span.clone(), anchor(paper.url(), &citation.matched)));
            }
            (Some(_), Some(_)) => {
                tracing::debug!(
                    citation = %citation.matched,
                    "Ambiguous citation left unlinked"
                );
            }
            (None, _) => {
                tracing::trace!(citation = %citation.matched, "Citation matches no paper");
            }
        }
    }

    tracing::debug!(count = edits.len(), "Linked citations");
    splice(text, &edits)
}

/// Literal-title matcher with whitespace flexibility and word-boundary checks.
struct TitleMatcher {
    pattern: Regex,
    bounded_start: bool,
    bounded_end: bool,
}

impl TitleMatcher {
    fn new(title: &str) -> Option<Self> {
        let words: Vec<&str> = title.split_whitespace().collect();
        let first = words.first()?.chars().next()?;
        let last = words.last()?.chars().next_back()?;

        let source = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join(r"\s+");
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .ok()?;

        Some(Self {
            pattern,
            bounded_start: is_word_char(first),
            bounded_end: is_word_char(last),
        })
    }

    /// Occurrences that sit on word boundaries and outside existing anchors.
    fn find_unlinked(&self, text: &str) -> Vec<Range<usize>> {
        let protected = anchor_spans(text);
        let mut found = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            let Some(m) = self.pattern.find_at(text, pos) else {
                break;
            };
            let range = m.range();

            let start_ok = !self.bounded_start
                || !text[..range.start]
                    .chars()
                    .next_back()
                    .is_some_and(is_word_char);
            let end_ok = !self.bounded_end
                || !text[range.end..].chars().next().is_some_and(is_word_char);

            if start_ok && end_ok && !range.is_empty() && !overlaps_any(&range, protected.iter()) {
                pos = range.end;
                found.push(range);
            } else {
                let step = text[range.start..].chars().next().map_or(1, char::len_utf8);
                pos = range.start + step;
            }
        }

        found
    }
}

/// Byte ranges of every `<a ...>...</a>` element in `text`.
fn anchor_spans(text: &str) -> Vec<Range<usize>> {
    ANCHOR.find_iter(text).map(|m| m.range()).collect()
}

fn overlaps_any<'a>(
    span: &Range<usize>,
    mut others: impl Iterator<Item = &'a Range<usize>>,
) -> bool {
    others.any(|other| span.start < other.end && other.start < span.end)
}

/// Apply sorted, non-overlapping replacements.
fn splice(text: &str, edits: &[(Range<usize>, String)]) -> String {
    let added: usize = edits.iter().map(|(_, r)| r.len()).sum();
    let mut out = String::with_capacity(text.len() + added);
    let mut cursor = 0;

    for (span, replacement) in edits {
        out.push_str(&text[cursor..span.start]);
        out.push_str(replacement);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, authors: &[&str], url: &str) -> PaperRecord {
        let authors = authors.iter().map(|a| (*a).to_string()).collect();
        PaperRecord::new(title, authors, "", url).unwrap()
    }

    #[test]
    fn test_links_titles_round_trip() {
        let papers = vec![
            paper("Paper One", &[], "http://example.com/1"),
            paper("Paper Two", &[], "http://example.com/2"),
        ];
        let result = annotate("Check out Paper One and Paper Two", &papers);
        assert_eq!(
            result,
            r#"Check out <a href="http://example.com/1" target="_blank">Paper One</a> and <a href="http://example.com/2" target="_blank">Paper Two</a>"#
        );
    }

    #[test]
    fn test_longest_title_wins() {
        let papers = vec![
            paper("Attention", &[], "http://example.com/short"),
            paper("Attention Is All You Need", &[], "http://example.com/long"),
        ];
        let result = link_titles("We revisit Attention Is All You Need today.", &papers);
        assert_eq!(
            result,
            r#"We revisit <a href="http://example.com/long" target="_blank">Attention Is All You Need</a> today."#
        );
        assert!(!result.contains("http://example.com/short"));
    }

    #[test]
    fn test_title_match_is_case_and_whitespace_flexible() {
        let papers = vec![paper("Scaling  Laws\n for Agents", &[], "u1")];
        let result = link_titles("New scaling laws for\nagents are out.", &papers);
        assert_eq!(
            result,
            "New <a href=\"u1\" target=\"_blank\">scaling laws for\nagents</a> are out."
        );
    }

    #[test]
    fn test_linked_title_keeps_written_form() {
        let papers = vec![paper("Sparse Attention Revisited", &[], "u1")];
        let text = "SPARSE attention\n  REVISITED, twice: sparse attention revisited";
        let result = link_titles(text, &papers);
        assert_eq!(
            result,
            concat!(
                "<a href=\"u1\" target=\"_blank\">SPARSE attention\n  REVISITED</a>, twice: ",
                "<a href=\"u1\" target=\"_blank\">sparse attention revisited</a>"
            )
        );
    }

    #[test]
    fn test_title_requires_whole_words() {
        let papers = vec![paper("Net", &[], "u1")];
        assert_eq!(link_titles("A ResNet variant", &papers), "A ResNet variant");
    }

    #[test]
    fn test_title_with_trailing_punctuation() {
        let papers = vec![paper("Is Scale All You Need?", &[], "u1")];
        let result = link_titles("In Is Scale All You Need? the authors argue", &papers);
        assert!(
            result.contains(r#"<a href="u1" target="_blank">Is Scale All You Need?</a>"#)
        );
    }

    #[test]
    fn test_citation_links_single_author() {
        let papers = vec![
            paper("Alpha", &["Min Lee"], "http://arxiv.org/abs/2301.00001v1"),
            paper("Beta", &["Soo Kim"], "http://arxiv.org/abs/2302.00002v1"),
        ];
        let result = link_citations("As Lee (2023) shows.", &papers);
        assert_eq!(
            result,
            r#"As <a href="http://arxiv.org/abs/2301.00001v1" target="_blank">Lee (2023)</a> shows."#
        );
    }

    #[test]
    fn test_ambiguous_citation_untouched() {
        let papers = vec![
            paper("Alpha", &["Min Lee"], "http://arxiv.org/abs/2301.00001v1"),
            paper("Beta", &["Jae Lee"], "http://arxiv.org/abs/2305.00002v1"),
        ];
        assert_eq!(
            link_citations("As Lee (2023) shows.", &papers),
            "As Lee (2023) shows."
        );
    }

    #[test]
    fn test_citation_year_must_match() {
        let papers = vec![paper(
            "Alpha",
            &["Min Lee"],
            "http://arxiv.org/abs/2401.00001v1",
        )];
        assert_eq!(link_citations("Lee (2023)", &papers), "Lee (2023)");
    }

    #[test]
    fn test_two_author_citation_prefers_full_span() {
        let papers = vec![paper(
            "Gamma",
            &["Min Lee", "Soo Kim"],
            "http://arxiv.org/abs/2303.00003",
        )];
        let result = link_citations("Lee and Kim (2023) agree.", &papers);
        assert_eq!(
            result,
            r#"<a href="http://arxiv.org/abs/2303.00003" target="_blank">Lee and Kim (2023)</a> agree."#
        );
    }

    #[test]
    fn test_et_al_citation_uses_first_surname() {
        let papers = vec![paper(
            "Delta",
            &["Ann Smith", "Bo Jones", "Cy Wu"],
            "http://arxiv.org/abs/2404.01234",
        )];
        let result = link_citations("Smith et al. (2024) report gains.", &papers);
        assert!(result.starts_with(
            r#"<a href="http://arxiv.org/abs/2404.01234" target="_blank">Smith et al. (2024)</a>"#
        ));
    }

    #[test]
    fn test_citation_inside_linked_title_is_left_alone() {
        let papers = vec![
            paper("Revisiting Lee (2023)", &[], "http://example.com/t"),
            paper("Alpha", &["Min Lee"], "http://arxiv.org/abs/2301.00001v1"),
        ];
        let result = annotate("We read Revisiting Lee (2023) closely.", &papers);
        assert_eq!(
            result,
            r#"We read <a href="http://example.com/t" target="_blank">Revisiting Lee (2023)</a> closely."#
        );
    }

    #[test]
    fn test_annotate_without_papers_is_identity() {
        let text = "Nothing to link, not even Smith et al. (2024).";
        assert_eq!(annotate(text, &[]), text);
    }
}

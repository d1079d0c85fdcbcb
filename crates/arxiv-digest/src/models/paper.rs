//! Paper record as retrieved from the arXiv feed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DigestError, DigestResult};

/// New-style arXiv identifier: `YYMM.NNNNN`, optionally versioned.
static ARXIV_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{2})([0-9]{2})\.[0-9]{4,5}(?:v[0-9]+)?(?:$|[^0-9])")
        .expect("arXiv id pattern is valid")
});

/// One retrieved publication.
///
/// Records are validated at construction and never mutated afterwards. The `url`
/// doubles as the identity key within a run and as the hyperlink target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPaperRecord")]
pub struct PaperRecord {
    title: String,
    authors: Vec<String>,
    summary: String,
    url: String,
}

/// Unvalidated shape used when reading cached records.
#[derive(Deserialize)]
struct RawPaperRecord {
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    summary: String,
    url: String,
}

impl TryFrom<RawPaperRecord> for PaperRecord {
    type Error = DigestError;

    fn try_from(raw: RawPaperRecord) -> DigestResult<Self> {
        Self::new(raw.title, raw.authors, raw.summary, raw.url)
    }
}

impl PaperRecord {
    /// Create a paper record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the title or url is blank.
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        summary: impl Into<String>,
        url: impl Into<String>,
    ) -> DigestResult<Self> {
        let title = title.into();
        let url = url.into();

        if title.trim().is_empty() {
            return Err(DigestError::invalid_input("title", "cannot be empty"));
        }
        if url.trim().is_empty() {
            return Err(DigestError::invalid_input("url", "cannot be empty"));
        }

        Ok(Self {
            title,
            authors,
            summary: summary.into(),
            url,
        })
    }

    /// Paper title as published.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author display names, in byline order.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Abstract text.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Canonical abstract URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }

    /// Surnames used for citation matching: the last whitespace token of each author.
    #[must_use]
    pub fn author_surnames(&self) -> Vec<&str> {
        self.authors
            .iter()
            .filter_map(|name| name.split_whitespace().next_back())
            .collect()
    }

    /// Publication year decoded from the `YYMM` prefix of the arXiv identifier.
    ///
    /// Returns `None` when the url carries no new-style identifier.
    #[must_use]
    pub fn publication_year(&self) -> Option<i32> {
        let caps = ARXIV_ID_PATTERN.captures(&self.url)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;

        (1..=12).contains(&month).then_some(2000 + year)
    }

    /// Serialized representation sent to the LLM and counted against the batch budget.
    #[must_use]
    pub fn prompt_entry(&self) -> String {
        format!(
            "**Title:** {}\n**Authors:** {}\n**Summary:** {}\n",
            self.title,
            self.author_names(),
            self.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(url: &str) -> PaperRecord {
        PaperRecord::new(
            "Test Paper Title",
            vec!["Author One".to_string(), "Ji-Hoon Two".to_string()],
            "This is a test summary",
            url,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_blank_title_and_url() {
        assert!(PaperRecord::new("  ", vec![], "", "http://arxiv.org/abs/2301.00001").is_err());
        assert!(PaperRecord::new("Title", vec![], "", "").is_err());
    }

    #[test]
    fn test_prompt_entry_format() {
        let entry = paper("https://arxiv.org/abs/1234.5678").prompt_entry();
        assert_eq!(
            entry,
            "**Title:** Test Paper Title\n**Authors:** Author One, Ji-Hoon Two\n**Summary:** This is a test summary\n"
        );
    }

    #[test]
    fn test_publication_year_from_arxiv_id() {
        assert_eq!(paper("http://arxiv.org/abs/2301.12345v2").publication_year(), Some(2023));
        assert_eq!(paper("https://arxiv.org/abs/2412.00001").publication_year(), Some(2024));
        assert_eq!(paper("http://arxiv.org/abs/0704.0001v1").publication_year(), Some(2007));
    }

    #[test]
    fn test_publication_year_unresolvable() {
        assert_eq!(paper("http://arxiv.org/abs/hep-th/9901001v1").publication_year(), None);
        assert_eq!(paper("http://example.com/1").publication_year(), None);
        // month 13 is not a valid identifier
        assert_eq!(paper("http://arxiv.org/abs/2313.00001").publication_year(), None);
    }

    #[test]
    fn test_author_surnames() {
        let record = paper("http://arxiv.org/abs/2301.00001");
        assert_eq!(record.author_surnames(), vec!["One", "Two"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<PaperRecord, _> = serde_json::from_value(serde_json::json!({
            "title": "A", "authors": ["B C"], "summary": "s", "url": "u"
        }));
        assert!(ok.is_ok());

        let bad: Result<PaperRecord, _> = serde_json::from_value(serde_json::json!({
            "title": "", "url": "u"
        }));
        assert!(bad.is_err());
    }
}

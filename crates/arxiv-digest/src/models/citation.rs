//! Author-year citation spans found in generated prose.

use std::ops::Range;

/// One author-year reference, e.g. `Smith et al. (2024)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Surname, or `"Surname1 and Surname2"` for two-author citations.
    pub author_key: String,

    /// Four-digit year as written.
    pub year: i32,

    /// Exact text that matched.
    pub matched: String,

    /// Byte range of `matched` in the scanned text.
    pub span: Range<usize>,
}

impl Citation {
    /// Individual surnames named by the citation.
    #[must_use]
    pub fn surnames(&self) -> Vec<&str> {
        self.author_key.split(" and ").map(str::trim).collect()
    }
}

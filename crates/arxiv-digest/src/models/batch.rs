//! Batches of papers and the outcome of summarizing each one.

use super::PaperRecord;

/// A contiguous, non-empty run of papers serialized into one LLM prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Papers in input order.
    pub papers: &'a [PaperRecord],

    /// Concatenated prompt entries of `papers`.
    pub text: String,

    /// Character count of the template plus `text`.
    pub length: usize,
}

impl Batch<'_> {
    /// Number of papers in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Batches are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Result of one per-batch LLM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The LLM returned a summary.
    Summarized {
        /// Position of the batch in the original order.
        index: usize,
        /// Summary text.
        text: String,
    },
    /// The call failed; the batch is left out of the narrative.
    Failed {
        /// Position of the batch in the original order.
        index: usize,
        /// Why it failed.
        reason: String,
    },
}

impl BatchOutcome {
    /// Original batch index.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Summarized { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    /// Summary text if the batch succeeded.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Summarized { text, .. } => Some(text),
            Self::Failed { .. } => None,
        }
    }

    /// Returns true if the batch failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

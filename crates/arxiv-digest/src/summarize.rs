//! Map-then-reduce summarization of papers through an LLM.
//!
//! Papers are batched to fit the model context, each batch is summarized on its
//! own, and several batch summaries are merged by one final combine call. A failed
//! batch is skipped rather than failing the run; a failed combine falls back to
//! plain concatenation.

use futures::stream::{self, StreamExt};

use crate::batch::batch_papers;
use crate::client::CompletionProvider;
use crate::config::{llm, prompts};
use crate::error::DigestResult;
use crate::models::{Batch, BatchOutcome, PaperRecord};

/// Separator between batch summaries in the combine prompt and in the fallback.
const SUMMARY_SEPARATOR: &str = "\n\n";

/// Narrative plus per-batch bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Final narrative; empty when no batch succeeded.
    pub narrative: String,

    /// Number of batches the papers were split into.
    pub batch_count: usize,

    /// One outcome per batch, in batch order.
    pub outcomes: Vec<BatchOutcome>,
}

impl Summary {
    /// Number of batches whose LLM call failed.
    #[must_use]
    pub fn failed_batches(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

/// Batches papers and drives the summary and combine calls.
#[derive(Debug, Clone)]
pub struct SummaryAggregator {
    max_length: usize,
    concurrency: usize,
}

impl SummaryAggregator {
    /// Create an aggregator with a character budget per batch prompt.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            concurrency: 1,
        }
    }

    /// Character budget per batch prompt.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Allow up to `concurrency` batch calls in flight (minimum 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Summarize `papers` into a single narrative.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `papers` is empty or malformed. LLM failures are
    /// absorbed as described in the module docs.
    pub async fn summarize(
        &self,
        papers: &[PaperRecord],
        batch_llm: &dyn CompletionProvider,
        combine_llm: &dyn CompletionProvider,
    ) -> DigestResult<String> {
        let summary = self
            .summarize_detailed(papers, batch_llm, combine_llm)
            .await?;
        Ok(summary.narrative)
    }

    /// Like [`summarize`](Self::summarize) but also returns the per-batch outcomes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `papers` is empty or malformed.
    pub async fn summarize_detailed(
        &self,
        papers: &[PaperRecord],
        batch_llm: &dyn CompletionProvider,
        combine_llm: &dyn CompletionProvider,
    ) -> DigestResult<Summary> {
        let batches = batch_papers(papers, self.max_length, prompts::SUMMARY_PROMPT)?;
        tracing::info!(
            papers = papers.len(),
            batches = batches.len(),
            "Summarizing papers"
        );

        // buffered() yields in submission order, whatever order the calls finish in
        let outcomes: Vec<BatchOutcome> = stream::iter(batches.iter().enumerate())
            .map(|(index, batch)| summarize_batch(index, batch, batch_llm))
            .buffered(self.concurrency)
            .collect()
            .await;

        let narrative = combine_outcomes(&outcomes, combine_llm).await;

        Ok(Summary {
            narrative,
            batch_count: batches.len(),
            outcomes,
        })
    }
}

impl Default for SummaryAggregator {
    fn default() -> Self {
        Self::new(llm::MAX_LENGTH)
    }
}

/// Prompt sent for one batch.
#[must_use]
pub fn batch_prompt(batch: &Batch<'_>) -> String {
    format!("{}{}", prompts::SUMMARY_PROMPT, batch.text)
}

async fn summarize_batch(
    index: usize,
    batch: &Batch<'_>,
    llm: &dyn CompletionProvider,
) -> BatchOutcome {
    tracing::debug!(
        batch = index,
        papers = batch.len(),
        length = batch.length,
        "Requesting batch summary"
    );

    match llm.complete(&batch_prompt(batch)).await {
        Ok(text) => BatchOutcome::Summarized { index, text },
        Err(e) => {
            tracing::warn!(
                batch = index,
                papers = batch.len(),
                error = %e,
                "Batch summary failed, skipping"
            );
            BatchOutcome::Failed {
                index,
                reason: e.to_string(),
            }
        }
    }
}

/// Reduce batch outcomes to one narrative.
///
/// No successes give an empty string, one success is returned verbatim, several
/// are merged by `combine_llm`, falling back to blank-line concatenation if that
/// call fails.
pub async fn combine_outcomes(
    outcomes: &[BatchOutcome],
    combine_llm: &dyn CompletionProvider,
) -> String {
    let mut ordered: Vec<&BatchOutcome> = outcomes.iter().collect();
    ordered.sort_by_key(|o| o.index());

    let summaries: Vec<&str> = ordered
        .into_iter()
        .filter_map(BatchOutcome::summary)
        .collect();

    match summaries.as_slice() {
        [] => {
            tracing::warn!(batches = outcomes.len(), "No batch produced a summary");
            String::new()
        }
        [only] => (*only).to_string(),
        many => {
            let joined = many.join(SUMMARY_SEPARATOR);
            let prompt = format!("{}{}", prompts::COMBINE_PROMPT, joined);

            match combine_llm.complete(&prompt).await {
                Ok(narrative) => narrative,
                Err(e) => {
                    tracing::warn!(
                        summaries = many.len(),
                        error = %e,
                        "Combine call failed, concatenating summaries"
                    );
                    joined
                }
            }
        }
    }
}

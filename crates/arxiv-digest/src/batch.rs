//! Partitioning papers into prompt-sized batches.

use std::collections::HashSet;

use crate::error::{DigestError, DigestResult};
use crate::models::{Batch, PaperRecord};

/// Split `papers` into contiguous batches whose prompt fits in `max_length` characters.
///
/// Every batch starts with the length of `template_overhead` already counted. A paper
/// that would push the running total over the budget closes the current batch,
/// unless that batch is still empty: an oversized paper is never dropped, it gets a
/// batch of its own. Flattening the result gives back `papers` unchanged.
///
/// # Errors
///
/// Returns `InvalidInput` if `papers` is empty or two papers share a url.
pub fn batch_papers<'a>(
    papers: &'a [PaperRecord],
    max_length: usize,
    template_overhead: &str,
) -> DigestResult<Vec<Batch<'a>>> {
    if papers.is_empty() {
        return Err(DigestError::invalid_input("papers", "nothing to batch"));
    }
    ensure_unique_urls(papers)?;

    let overhead = template_overhead.chars().count();
    let mut batches = Vec::new();
    let mut start = 0;
    let mut text = String::new();
    let mut running = overhead;

    for (i, paper) in papers.iter().enumerate() {
        let entry = paper.prompt_entry();
        let length = entry.chars().count();

        if running + length > max_length && i > start {
            batches.push(Batch {
                papers: &papers[start..i],
                text: std::mem::take(&mut text),
                length: running,
            });
            start = i;
            running = overhead;
        }

        if overhead + length > max_length {
            tracing::warn!(
                url = paper.url(),
                length,
                max_length,
                "Paper exceeds batch budget on its own"
            );
        }

        text.push_str(&entry);
        running += length;
    }

    batches.push(Batch {
        papers: &papers[start..],
        text,
        length: running,
    });

    tracing::debug!(
        papers = papers.len(),
        batches = batches.len(),
        max_length,
        "Batched papers"
    );
    Ok(batches)
}

/// Reject collections in which two records share a url.
///
/// # Errors
///
/// Returns `InvalidInput` naming the first duplicated url.
pub fn ensure_unique_urls(papers: &[PaperRecord]) -> DigestResult<()> {
    let mut seen = HashSet::with_capacity(papers.len());
    for paper in papers {
        if !seen.insert(paper.url()) {
            let message = format!("duplicate url {}", paper.url());
            return Err(DigestError::invalid_input("papers", message));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(i: usize, summary_len: usize) -> PaperRecord {
        PaperRecord::new(
            format!("Paper {i}"),
            vec!["Ada Lovelace".to_string()],
            "x".repeat(summary_len),
            format!("http://arxiv.org/abs/2401.{i:05}"),
        )
        .unwrap()
    }

    fn entry_len(p: &PaperRecord) -> usize {
        p.prompt_entry().chars().count()
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = batch_papers(&[], 1000, "T").unwrap_err();
        assert!(matches!(err, DigestError::InvalidInput { .. }));
    }

    #[test]
    fn test_duplicate_urls_are_rejected() {
        let papers = vec![paper(1, 10), paper(1, 20)];
        assert!(batch_papers(&papers, 1000, "").is_err());
    }

    #[test]
    fn test_everything_fits_in_one_batch() {
        let papers = vec![paper(1, 10), paper(2, 10), paper(3, 10)];
        let batches = batch_papers(&papers, 10_000, "template").unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].papers.len(), 3);
        let joined: String = papers.iter().map(PaperRecord::prompt_entry).collect();
        assert_eq!(batches[0].text, joined);
    }

    #[test]
    fn test_splits_when_budget_exceeded() {
        let papers = vec![paper(1, 100), paper(2, 100), paper(3, 100)];
        let template = "T".repeat(10);
        let budget = 10 + entry_len(&papers[0]) + entry_len(&papers[1]);

        let batches = batch_papers(&papers, budget, &template).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].papers, &papers[..2]);
        assert_eq!(batches[1].papers, &papers[2..]);
        assert_eq!(batches[0].length, budget);
    }

    #[test]
    fn test_oversized_paper_gets_own_batch() {
        let papers = vec![paper(1, 10), paper(2, 5_000), paper(3, 10)];
        let batches = batch_papers(&papers, 500, "").unwrap();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].papers, &papers[1..2]);
        assert!(batches[1].length > 500);
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let wide = PaperRecord::new("Überblick", vec![], "ü".repeat(50), "u1").unwrap();
        let batches = batch_papers(std::slice::from_ref(&wide), 10_000, "é").unwrap();
        assert_eq!(batches[0].length, 1 + entry_len(&wide));
    }
}

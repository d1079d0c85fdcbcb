//! Benchmarks for batching and hyperlinking over a day-sized paper set.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use arxiv_digest::PaperRecord;
use arxiv_digest::batch::batch_papers;
use arxiv_digest::config::prompts;
use arxiv_digest::text::annotate;

const SURNAMES: [&str; 8] = ["Lee", "Kim", "Smith", "Jones", "Patel", "Chen", "Garcia", "Novak"];

fn papers(count: usize) -> Vec<PaperRecord> {
    (0..count)
        .map(|i| {
            let authors = vec![
                format!("Ann {}", SURNAMES[i % SURNAMES.len()]),
                format!("Bo {}", SURNAMES[(i + 3) % SURNAMES.len()]),
            ];
            PaperRecord::new(
                format!("Study Number {i} of Efficient Models"),
                authors,
                "We propose a method and evaluate it on several benchmarks. ".repeat(20),
                format!("http://arxiv.org/abs/2401.{i:05}v1"),
            )
            .expect("benchmark record is valid")
        })
        .collect()
}

fn narrative(papers: &[PaperRecord]) -> String {
    papers
        .iter()
        .step_by(3)
        .enumerate()
        .map(|(i, paper)| {
            format!(
                "## Theme {i}\n{} shows gains, as {} et al. (2024) argue.\n\n",
                paper.title(),
                SURNAMES[i % SURNAMES.len()]
            )
        })
        .collect()
}

fn bench_batching(c: &mut Criterion) {
    let papers = papers(400);

    c.bench_function("batch_papers/400", |b| {
        b.iter(|| {
            batch_papers(black_box(&papers), 20_000, prompts::SUMMARY_PROMPT)
                .map(|batches| batches.len())
        });
    });
}

fn bench_annotate(c: &mut Criterion) {
    let papers = papers(400);
    let text = narrative(&papers);

    c.bench_function("annotate/400", |b| {
        b.iter(|| annotate(black_box(&text), black_box(&papers)));
    });
}

criterion_group!(benches, bench_batching, bench_annotate);
criterion_main!(benches);

//! End-to-end digest run: fetch, summarize, rank, annotate, publish.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::batch::batch_papers;
use crate::client::{ArxivClient, ChatSettings, CompletionProvider, OpenAiClient, PaperSource};
use crate::config::{Config, prompts};
use crate::error::DigestResult;
use crate::models::PaperRecord;
use crate::publish::BlogPublisher;
use crate::store::PaperStore;
use crate::summarize::SummaryAggregator;
use crate::text::{annotate, extract_ranked_titles, select_papers_by_titles};

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestReport {
    /// Papers considered.
    pub paper_count: usize,

    /// Batches the papers were split into.
    pub batch_count: usize,

    /// Batches left out because their LLM call failed.
    pub failed_batches: usize,

    /// Titles of the papers picked as the day's highlights.
    pub featured: Vec<String>,

    /// Final hyperlinked text.
    pub narrative: String,

    /// Where the post was written, if it was.
    pub post_path: Option<PathBuf>,
}

/// Wires a paper source and LLM providers into one daily run.
pub struct DigestPipeline {
    source: Arc<dyn PaperSource>,
    summarizer: Arc<dyn CompletionProvider>,
    combiner: Arc<dyn CompletionProvider>,
    aggregator: SummaryAggregator,
    store: Option<PaperStore>,
    publisher: Option<BlogPublisher>,
    top_papers: bool,
}

impl DigestPipeline {
    /// Create a pipeline with default batching, no cache and no publisher.
    #[must_use]
    pub fn new(
        source: Arc<dyn PaperSource>,
        summarizer: Arc<dyn CompletionProvider>,
        combiner: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            source,
            summarizer,
            combiner,
            aggregator: SummaryAggregator::default(),
            store: None,
            publisher: None,
            top_papers: false,
        }
    }

    /// Build the production pipeline described by `config`.
    ///
    /// With `dry_run` no post is written.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn from_config(config: &Config, dry_run: bool) -> anyhow::Result<Self> {
        let arxiv = ArxivClient::new(config)?;
        let llm = OpenAiClient::new(config)?;
        let combiner = llm.with_settings(ChatSettings::combine());

        let aggregator = SummaryAggregator::new(config.max_length)
            .with_concurrency(config.batch_concurrency);

        let mut pipeline = Self::new(Arc::new(arxiv), Arc::new(llm), Arc::new(combiner))
            .with_aggregator(aggregator)
            .with_top_papers(config.top_papers);

        if config.is_dev() {
            pipeline = pipeline.with_store(PaperStore::new(config.cache_dir()));
        }
        if !dry_run {
            pipeline = pipeline.with_publisher(BlogPublisher::new(config.posts_dir()));
        }

        Ok(pipeline)
    }

    /// Replace the batching and concurrency settings.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: SummaryAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Cache fetched papers and reuse the cache on later runs.
    #[must_use]
    pub fn with_store(mut self, store: PaperStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Write the result as a blog post.
    #[must_use]
    pub fn with_publisher(mut self, publisher: BlogPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Ask for a top-five list after summarizing.
    #[must_use]
    pub const fn with_top_papers(mut self, enabled: bool) -> Self {
        self.top_papers = enabled;
        self
    }

    /// Run the digest for `date`.
    ///
    /// # Errors
    ///
    /// Returns error if papers cannot be fetched, the cache cannot be used, or the
    /// post cannot be written. LLM failures degrade the narrative instead.
    pub async fn run(&self, date: NaiveDate) -> DigestResult<DigestReport> {
        let papers = self.load_papers(date).await?;
        if papers.is_empty() {
            tracing::info!(%date, "No papers to digest");
            return Ok(DigestReport::default());
        }

        let summary = self
            .aggregator
            .summarize_detailed(&papers, self.summarizer.as_ref(), self.combiner.as_ref())
            .await?;

        let batch_count = summary.batch_count;
        let failed_batches = summary.failed_batches();
        let mut narrative = summary.narrative;
        let mut featured = Vec::new();

        if self.top_papers && !narrative.trim().is_empty() {
            if let Some(ranking) = self.rank_papers(&papers).await {
                featured = select_papers_by_titles(&papers, &extract_ranked_titles(&ranking))
                    .into_iter()
                    .map(|paper| paper.title().to_string())
                    .collect();
                narrative = format!("{narrative}\n\n{ranking}");
            }
        }

        let narrative = annotate(&narrative, &papers);

        let post_path = match self.publisher {
            Some(_) if narrative.trim().is_empty() => {
                tracing::warn!(%date, "Narrative is empty, not publishing");
                None
            }
            Some(ref publisher) => {
                let path = publisher.publish(date, papers.len(), &narrative).await?;
                Some(path)
            }
            None => None,
        };

        Ok(DigestReport {
            paper_count: papers.len(),
            batch_count,
            failed_batches,
            featured,
            narrative,
            post_path,
        })
    }

    async fn load_papers(&self, date: NaiveDate) -> DigestResult<Vec<PaperRecord>> {
        if let Some(ref store) = self.store {
            if let Some(papers) = store.load(date).await? {
                tracing::info!(count = papers.len(), "Using cached papers");
                return Ok(papers);
            }
        }

        let papers = self.source.fetch_papers().await?;

        match self.store {
            Some(ref store) if !papers.is_empty() => {
                store.save(date, &papers).await?;
            }
            _ => {}
        }
        Ok(papers)
    }

    /// Ask for the day's top five, ranked over as many papers as fit one prompt.
    async fn rank_papers(&self, papers: &[PaperRecord]) -> Option<String> {
        let budget = self.aggregator.max_length();
        let batches = batch_papers(papers, budget, prompts::TOP_PAPERS_PROMPT).ok()?;
        let candidates = batches.first()?;
        if batches.len() > 1 {
            tracing::info!(
                ranked = candidates.len(),
                total = papers.len(),
                "Ranking only the papers that fit one prompt"
            );
        }

        let prompt = format!("{}{}", prompts::TOP_PAPERS_PROMPT, candidates.text);

        match self.summarizer.complete(&prompt).await {
            Ok(ranking) if !ranking.trim().is_empty() => Some(ranking),
            Ok(_) => {
                tracing::warn!("Top papers answer was empty");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Top papers request failed, skipping");
                None
            }
        }
    }
}

impl std::fmt::Debug for DigestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestPipeline")
            .field("aggregator", &self.aggregator)
            .field("store", &self.store)
            .field("publisher", &self.publisher)
            .field("top_papers", &self.top_papers)
            .finish_non_exhaustive()
    }
}

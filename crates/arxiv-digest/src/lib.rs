//! arXiv Digest
//!
//! Turns the day's arXiv listing into a single readable blog post. Paper abstracts
//! are batched to fit an LLM context window, summarized batch by batch, merged into
//! one narrative, and finally hyperlinked: paper titles and author-year citations
//! in the generated prose point back at the papers they name.
//!
//! # Features
//!
//! - **Context-aware batching**: prompts stay within a character budget without
//!   ever dropping a paper
//! - **Degrades gracefully**: failed batches are skipped, a failed merge falls back
//!   to concatenation
//! - **Citation linking**: `Smith et al. (2024)` style references resolve to the
//!   one paper they can only mean, or stay plain text
//! - **Async-first**: Tokio, with retrying HTTP clients for arXiv and the LLM
//!
//! # Example
//!
//! ```no_run
//! use arxiv_digest::{config::Config, DigestPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = DigestPipeline::from_config(&config, true)?;
//!
//!     let report = pipeline.run(chrono::Utc::now().date_naive()).await?;
//!     println!("{}", report.narrative);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod store;
pub mod summarize;
pub mod text;

pub use batch::batch_papers;
pub use client::{ArxivClient, CompletionProvider, FnProvider, OpenAiClient, PaperSource};
pub use config::Config;
pub use error::{ClientError, DigestError};
pub use models::PaperRecord;
pub use pipeline::{DigestPipeline, DigestReport};
pub use summarize::SummaryAggregator;
pub use text::annotate;

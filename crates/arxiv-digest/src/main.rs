//! arXiv digest - Entry Point
//!
//! Fetches the day's papers, summarizes them and writes the blog post.

use std::path::PathBuf;

use anyhow::bail;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use arxiv_digest::{Config, DigestPipeline};

#[derive(Parser, Debug)]
#[command(name = "arxiv-digest")]
#[command(about = "Daily arXiv digest with batched LLM summaries")]
#[command(version)]
struct Cli {
    /// LLM provider API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Project root holding blog/_posts and the dev cache
    #[arg(long, env = "PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// arXiv search query (arXiv syntax, e.g. cat:cs.LG+OR+cat:cs.AI)
    #[arg(long)]
    query: Option<String>,

    /// Character budget per batch prompt
    #[arg(long)]
    max_length: Option<usize>,

    /// Batch summaries in flight at once
    #[arg(long, default_value = "1")]
    batch_concurrency: usize,

    /// Skip the top-five ranking step
    #[arg(long)]
    no_top_papers: bool,

    /// Cache fetched papers under the project dir and reuse them
    #[arg(long)]
    dev: bool,

    /// Print the digest instead of writing the post
    #[arg(long)]
    dry_run: bool,

    /// Digest date (YYYY-MM-DD), defaults to today in UTC
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the environment configuration.
    fn apply(self, mut config: Config) -> Config {
        if let Some(key) = self.api_key {
            config.openai_api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.openai_model = model;
        }
        if let Some(dir) = self.project_dir {
            config.project_dir = dir;
        }
        if let Some(query) = self.query {
            config.search_query = query;
        }
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        config.batch_concurrency = self.batch_concurrency.max(1);
        config.top_papers = !self.no_top_papers;
        config.dev_mode |= self.dev;
        config
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout is reserved for --dry-run output
    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so clap's env fallbacks see its values
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let dry_run = cli.dry_run;
    let date = cli.date.unwrap_or_else(|| Utc::now().date_naive());
    let config = cli.apply(Config::from_env()?);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %date,
        model = %config.openai_model,
        dev = config.is_dev(),
        dry_run,
        "Starting arXiv digest"
    );

    if !config.has_api_key() {
        bail!("no LLM API key configured; set OPENAI_API_KEY or pass --api-key");
    }

    let pipeline = DigestPipeline::from_config(&config, dry_run)?;
    let report = match pipeline.run(date).await {
        Ok(report) => report,
        Err(e) => bail!(e.to_user_message()),
    };

    tracing::info!(
        papers = report.paper_count,
        batches = report.batch_count,
        failed_batches = report.failed_batches,
        featured = report.featured.len(),
        post = ?report.post_path,
        "Digest finished"
    );

    if dry_run {
        println!("{}", report.narrative);
    }

    Ok(())
}

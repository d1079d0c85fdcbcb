//! Configuration for the arXiv digest pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Upstream API configuration constants.
pub mod api {
    use std::time::Duration;

    /// arXiv export API query endpoint.
    pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";

    /// OpenAI-compatible API base.
    pub const OPENAI_API: &str = "https://api.openai.com/v1";

    /// Request timeout (combine calls over large batches are slow).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default arXiv search query (`+OR+` is arXiv's own syntax and must not be encoded).
    pub const SEARCH_QUERY: &str = "cat:cs.LG+OR+cat:cs.AI+OR+cat:cs.CL+OR+cat:cs.CV";

    /// Sort field for the feed.
    pub const SORT_BY: &str = "lastUpdatedDate";

    /// Sort order for the feed.
    pub const SORT_ORDER: &str = "descending";

    /// Entries requested per feed page.
    pub const FEED_PAGE_SIZE: usize = 50;

    /// Attempts per feed page before giving up.
    pub const FEED_MAX_RETRIES: u32 = 3;

    /// Fixed delay between feed attempts.
    pub const FEED_RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Minimum spacing between feed page requests.
    pub const FEED_PAGE_DELAY: Duration = Duration::from_secs(5);

    /// Never page past this start offset.
    pub const FEED_MAX_START: usize = 1200;

    /// Transient-failure retries for LLM calls. Off unless configured; a failed
    /// batch call is skipped by the aggregator instead.
    pub const LLM_MAX_RETRIES: u32 = 0;
}

/// LLM sizing constants.
pub mod llm {
    /// Default chat model.
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Context window of the default model, in tokens.
    pub const CONTEXT_WINDOW_TOKENS: usize = 128_000;

    /// Tokens reserved for the completion.
    pub const COMPLETION_TOKENS: usize = 16_000;

    /// Rough characters-per-token ratio for English prose.
    pub const CHARS_PER_TOKEN: usize = 4;

    /// Character budget for one batch prompt (template included).
    pub const MAX_LENGTH: usize = (CONTEXT_WINDOW_TOKENS - COMPLETION_TOKENS) * CHARS_PER_TOKEN;

    /// Completion cap for per-batch summaries.
    pub const SUMMARY_MAX_TOKENS: u32 = 16_000;

    /// Sampling temperature for per-batch summaries.
    pub const SUMMARY_TEMPERATURE: f32 = 0.5;

    /// Completion cap for the combine call.
    pub const COMBINE_MAX_TOKENS: u32 = 5_000;

    /// Sampling temperature for the combine call.
    pub const COMBINE_TEMPERATURE: f32 = 0.1;

    /// Nucleus sampling for the combine call.
    pub const COMBINE_TOP_P: f32 = 0.9;
}

/// Fixed prompt templates.
pub mod prompts {
    /// System message sent with every chat completion.
    pub const SYSTEM: &str = "You are a helpful assistant.";

    /// Per-batch summary instructions; the serialized papers are appended.
    pub const SUMMARY_PROMPT: &str = "\
You are a research scientist and professor with a PhD in machine learning.
You are also an educator skilled in explaining complex scientific concepts to the average technology professional.

You are provided with a collection of academic papers and their abstracts.
Your goal is to write a single, coherent blogpost-style summary (under 5000 words) that captures the major themes and findings across these papers.

Follow these instructions:
Identify Themes or Categories
Group related papers under clear, descriptive headings based on common research questions, areas, methods, or applications.

Summarize Key Developments
Within each theme, highlight the most important or noteworthy developments, insights, or discoveries and why they matter.
Mention specific papers by their exact title or by a short reference (e.g., \"Smith et al. (2024)\") when relevant to illustrate the point.

Synthesize and Connect
Show how these themes interrelate and discuss any overarching trends or future directions suggested by the body of work.

Maintain Clarity and Brevity
Write in a blogpost-friendly tone: clear, concise, and accessible to non-experts.
Use paragraphs or bullet points, and finish with a concluding paragraph that ties the overview together.

List of Papers and Abstracts:

";

    /// Instructions for merging several batch summaries; the summaries are appended.
    pub const COMBINE_PROMPT: &str = "\
You are an accomplished AI and Machine Learning research scientist and educator.
You are also an expert English proof reader and summarizer who can explain concepts.
Take all of the information below the heading SUMMARIES and convert that text into a single coherent
blogpost-style narrative that is short, compact, and easy to read. Keep every paper title and
author-year reference exactly as written.

SUMMARIES

";

    /// Instructions for picking the top papers; the serialized papers are appended.
    pub const TOP_PAPERS_PROMPT: &str = "\
You are given a list of academic papers and their abstracts, all within the fields of machine learning and artificial intelligence.
Your task is to identify the top five most interesting papers from this list based on their contributions to the ML/AI literature,
then explain your reasoning for each choice.

Instructions:
Select exactly five papers that you believe represent the most significant or groundbreaking work in the field.
List them as a numbered list where each entry starts with the exact paper title in bold,
for example: 1. **Paper Title** - reasoning.

List of Papers and Abstracts:

";
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM provider API key (optional for mock servers).
    pub openai_api_key: Option<String>,

    /// Chat model name.
    pub openai_model: String,

    /// Base URL for the chat completions API (for testing with mock servers).
    pub openai_api_url: String,

    /// arXiv query endpoint (for testing with mock servers).
    pub arxiv_api_url: String,

    /// arXiv search query.
    pub search_query: String,

    /// arXiv sort field.
    pub sort_by: String,

    /// arXiv sort order.
    pub sort_order: String,

    /// Project root; the paper cache and blog posts live under it.
    pub project_dir: PathBuf,

    /// Dev mode caches fetched papers on disk and reuses them.
    pub dev_mode: bool,

    /// Character budget per batch prompt.
    pub max_length: usize,

    /// Maximum batch summaries in flight.
    pub batch_concurrency: usize,

    /// Ask the LLM for a top-five list after summarizing.
    pub top_papers: bool,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Entries per feed page.
    pub feed_page_size: usize,

    /// Attempts per feed page.
    pub feed_max_retries: u32,

    /// Delay between feed attempts.
    pub feed_retry_delay: Duration,

    /// Minimum spacing between feed pages.
    pub feed_page_delay: Duration,

    /// Feed start offset cap.
    pub feed_max_start: usize,

    /// Transient-failure retries for LLM calls.
    pub llm_max_retries: u32,
}

impl Config {
    /// Create a new configuration with an optional LLM API key.
    #[must_use]
    pub fn new(openai_api_key: Option<String>) -> Self {
        Self {
            openai_api_key,
            openai_model: llm::DEFAULT_MODEL.to_string(),
            openai_api_url: api::OPENAI_API.to_string(),
            arxiv_api_url: api::ARXIV_API.to_string(),
            search_query: api::SEARCH_QUERY.to_string(),
            sort_by: api::SORT_BY.to_string(),
            sort_order: api::SORT_ORDER.to_string(),
            project_dir: PathBuf::from("."),
            dev_mode: false,
            max_length: llm::MAX_LENGTH,
            batch_concurrency: 1,
            top_papers: true,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            feed_page_size: api::FEED_PAGE_SIZE,
            feed_max_retries: api::FEED_MAX_RETRIES,
            feed_retry_delay: api::FEED_RETRY_DELAY,
            feed_page_delay: api::FEED_PAGE_DELAY,
            feed_max_start: api::FEED_MAX_START,
            llm_max_retries: api::LLM_MAX_RETRIES,
        }
    }

    /// Create a test configuration pointing both APIs at one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            openai_api_url: format!("{base_url}/v1"),
            arxiv_api_url: format!("{base_url}/api/query"),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            feed_page_size: 2,
            feed_max_retries: 2,
            feed_retry_delay: Duration::from_millis(1), // No real waiting in tests
            feed_page_delay: Duration::ZERO,
            feed_max_start: 20,
            llm_max_retries: 0,
            ..Self::new(Some("test-key".to_string()))
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("OPENAI_API_KEY").ok());
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Ok(query) = std::env::var("ARXIV_SEARCH_QUERY") {
            config.search_query = query;
        }
        if let Ok(dir) = std::env::var("PROJECT_DIR") {
            config.project_dir = PathBuf::from(dir);
        }
        config.dev_mode = std::env::var("PROJECT_ENV").is_ok_and(|env| env == "dev");
        if let Ok(retries) = std::env::var("OPENAI_MAX_RETRIES") {
            config.llm_max_retries = retries
                .parse()
                .map_err(|e| anyhow::anyhow!("OPENAI_MAX_RETRIES must be an integer: {e}"))?;
        }
        if let Ok(max_length) = std::env::var("DIGEST_MAX_LENGTH") {
            config.max_length = max_length
                .parse()
                .map_err(|e| anyhow::anyhow!("DIGEST_MAX_LENGTH must be an integer: {e}"))?;
        }

        Ok(config)
    }

    /// Check if an LLM API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Dev mode (`PROJECT_ENV=dev`): papers are cached on disk and reused.
    #[must_use]
    pub const fn is_dev(&self) -> bool {
        self.dev_mode
    }

    /// Directory holding cached paper lists.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }

    /// Directory receiving blog posts.
    #[must_use]
    pub fn posts_dir(&self) -> PathBuf {
        self.project_dir.join("blog").join("_posts")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

//! arXiv Atom feed client.
//!
//! Pages through the listing newest-first and stops one day behind the newest
//! entry, so a run picks up roughly the last day of submissions and updates.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use url::Url;

use super::{PaperSource, send};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::PaperRecord;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl AtomEntry {
    /// Abstract page url: the `alternate` link, else the entry id.
    fn abs_url(&self) -> &str {
        self.links
            .iter()
            .find(|link| link.rel.as_deref() == Some("alternate"))
            .map_or(self.id.trim(), |link| link.href.trim())
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.updated.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    fn into_record(self) -> crate::error::DigestResult<PaperRecord> {
        let url = self.abs_url().to_string();
        let title = self.title.split_whitespace().collect::<Vec<_>>().join(" ");
        let authors = self
            .authors
            .into_iter()
            .map(|a| a.name.trim().to_string())
            .collect();
        PaperRecord::new(title, authors, self.summary.trim(), url)
    }
}

/// Client for the arXiv export API.
#[derive(Clone)]
pub struct ArxivClient {
    /// HTTP client with retry middleware.
    client: ClientWithMiddleware,

    /// Query endpoint.
    api_url: Url,

    search_query: String,
    sort_by: String,
    sort_order: String,

    page_size: usize,
    max_retries: u32,
    retry_delay: Duration,
    max_start: usize,

    /// Request timeout, echoed back in timeout errors.
    timeout: Duration,

    /// Page pacing; `None` when the configured spacing is zero.
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ArxivClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint url is invalid or HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let api_url = Url::parse(&config.arxiv_api_url)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        // fixed spacing between attempts: both bounds are the retry delay
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.feed_retry_delay, config.feed_retry_delay)
            .build_with_max_retries(config.feed_max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let limiter = Quota::with_period(config.feed_page_delay)
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            api_url,
            search_query: config.search_query.clone(),
            sort_by: config.sort_by.clone(),
            sort_order: config.sort_order.clone(),
            page_size: config.feed_page_size.max(1),
            max_retries: config.feed_max_retries.max(1),
            retry_delay: config.feed_retry_delay,
            max_start: config.feed_max_start,
            timeout: config.request_timeout,
            limiter,
        })
    }

    /// Listing url for the page starting at `start`.
    ///
    /// The query string is set verbatim so arXiv's `+OR+` syntax survives.
    #[must_use]
    pub fn page_url(&self, start: usize) -> Url {
        let mut url = self.api_url.clone();
        url.set_query(Some(&format!(
            "search_query={}&sortBy={}&sortOrder={}&start={}&max_results={}",
            self.search_query, self.sort_by, self.sort_order, start, self.page_size
        )));
        url
    }

    /// Fetch every paper updated within a day of the newest one.
    ///
    /// A failing page ends the walk: papers gathered so far are returned, and the
    /// error is only surfaced when nothing was gathered.
    ///
    /// # Errors
    ///
    /// Returns error when the first page cannot be fetched or decoded.
    pub async fn fetch_recent(&self) -> ClientResult<Vec<PaperRecord>> {
        let mut papers: Vec<PaperRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cutoff: Option<DateTime<Utc>> = None;
        let mut start = 0;

        'pages: while start <= self.max_start {
            let entries = match self.fetch_page_with_retry(start).await {
                Ok(Some(entries)) => entries,
                Ok(None) => {
                    tracing::warn!(
                        start,
                        attempts = self.max_retries,
                        "Feed page stayed empty, stopping"
                    );
                    break;
                }
                Err(e) if papers.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        start,
                        error = %e,
                        collected = papers.len(),
                        "Feed page failed, keeping partial results"
                    );
                    break;
                }
            };

            for entry in entries {
                let Some(updated) = entry.updated_at() else {
                    tracing::warn!(
                        id = %entry.id,
                        updated = %entry.updated,
                        "Skipping entry without a valid timestamp"
                    );
                    continue;
                };
                let limit = *cutoff.get_or_insert_with(|| updated - TimeDelta::days(1));
                let reached_cutoff = updated <= limit;

                match entry.into_record() {
                    Ok(paper) if seen.insert(paper.url().to_string()) => papers.push(paper),
                    Ok(paper) => tracing::warn!(url = paper.url(), "Skipping duplicate entry"),
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed entry"),
                }

                if reached_cutoff {
                    tracing::debug!(%limit, "Reached cutoff");
                    break 'pages;
                }
            }

            start += self.page_size;
        }

        tracing::info!(count = papers.len(), "Fetched papers from arXiv");
        Ok(papers)
    }

    /// Fetch one page, retrying pages that come back without entries.
    ///
    /// `Ok(None)` means every attempt returned an empty page.
    async fn fetch_page_with_retry(&self, start: usize) -> ClientResult<Option<Vec<AtomEntry>>> {
        for attempt in 1..=self.max_retries {
            let entries = self.fetch_page(start).await?;
            if !entries.is_empty() {
                return Ok(Some(entries));
            }

            tracing::debug!(start, attempt, "Feed page had no entries");
            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Ok(None)
    }

    async fn fetch_page(&self, start: usize) -> ClientResult<Vec<AtomEntry>> {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }

        let url = self.page_url(start);
        tracing::debug!(%url, "Requesting feed page");

        let response = send(self.client.get(url), self.timeout).await?;
        let body = response.text().await?;
        let feed: AtomFeed = quick_xml::de::from_str(&body)?;

        Ok(feed.entries)
    }
}

#[async_trait::async_trait]
impl PaperSource for ArxivClient {
    async fn fetch_papers(&self) -> ClientResult<Vec<PaperRecord>> {
        self.fetch_recent().await
    }
}

impl std::fmt::Debug for ArxivClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivClient")
            .field("api_url", &self.api_url.as_str())
            .field("search_query", &self.search_query)
            .field("page_size", &self.page_size)
            .field("max_start", &self.max_start)
            .finish_non_exhaustive()
    }
}

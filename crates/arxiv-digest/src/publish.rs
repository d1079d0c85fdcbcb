//! Writing the digest as a Jekyll blog post.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::DigestResult;

/// Writes dated posts into a Jekyll `_posts` directory.
#[derive(Debug, Clone)]
pub struct BlogPublisher {
    posts_dir: PathBuf,
}

impl BlogPublisher {
    /// Publish into `posts_dir` (created on first write).
    #[must_use]
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    /// Post file for `date`.
    #[must_use]
    pub fn post_path(&self, date: NaiveDate) -> PathBuf {
        let name = format!("{}-daily-summary.markdown", date.format("%Y-%m-%d"));
        self.posts_dir.join(name)
    }

    /// Write the post for `date`, overwriting an existing one.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written.
    pub async fn publish(
        &self,
        date: NaiveDate,
        num_papers: usize,
        body: &str,
    ) -> DigestResult<PathBuf> {
        tokio::fs::create_dir_all(&self.posts_dir).await?;

        let path = self.post_path(date);
        tokio::fs::write(&path, render_post(date, num_papers, body)).await?;

        tracing::info!(path = %path.display(), num_papers, "Published blog post");
        Ok(path)
    }
}

/// Full post text: front matter, paper count heading, then `body`.
#[must_use]
pub fn render_post(date: NaiveDate, num_papers: usize, body: &str) -> String {
    format!(
        "---\n\
         layout: post\n\
         title: \"ArXiV papers Summary ({num_papers} papers summarized)\"\n\
         date: {date}\n\
         categories: summary\n\
         num_papers: {num_papers}\n\
         ---\n\n\
         ## Number of papers summarized: {num_papers}\n\n\
         {body}\n",
        date = date.format("%Y-%m-%d"),
    )
}

//! On-disk cache of fetched papers, one JSON file per day.
//!
//! Dev runs reuse the cached list instead of walking the feed again.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::DigestResult;
use crate::models::PaperRecord;

/// Directory of `papers-YYYY-MM-DD.json` files.
#[derive(Debug, Clone)]
pub struct PaperStore {
    dir: PathBuf,
}

impl PaperStore {
    /// Create a store rooted at `dir` (created lazily on first save).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the papers for `date`.
    #[must_use]
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("papers-{}.json", date.format("%Y-%m-%d")))
    }

    /// Write `papers` for `date`, replacing any earlier file.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written.
    pub async fn save(&self, date: NaiveDate, papers: &[PaperRecord]) -> DigestResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(date);
        let json = serde_json::to_vec_pretty(papers)?;
        tokio::fs::write(&path, json).await?;

        tracing::debug!(path = %path.display(), count = papers.len(), "Cached papers");
        Ok(path)
    }

    /// Read the papers cached for `date`, or `None` if there is no file.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or decoded.
    pub async fn load(&self, date: NaiveDate) -> DigestResult<Option<Vec<PaperRecord>>> {
        let path = self.path_for(date);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let papers: Vec<PaperRecord> = serde_json::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), count = papers.len(), "Loaded cached papers");
        Ok(Some(papers))
    }
}

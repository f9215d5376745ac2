//! News text, AI summary and keyword tracking.
//!
//! [`NewsDesk`] ties the pieces together with TTL caching. The summary and
//! keyword feeds read different page lists; each digest is reused for
//! `news_ttl`, and summaries are keyed by a hash of the text they summarize.

pub mod keywords;
pub mod source;
pub mod summary;

pub use keywords::{count_keywords, synthetic_history, track_keywords, KeywordPoint, KeywordReport};
pub use source::{gather_news, html_to_text, HttpNewsSource, NewsDigest, NewsError, NewsSource, SourceOutcome};
pub use summary::{analyst_prompt, truncate_chars, OpenAiSummarizer, Summarizer, SummaryError};

use crate::cache::TtlCache;
use crate::config::CacheConfig;

/// Which set of pages a digest is gathered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsFeed {
    /// Fed to the summarizer.
    Summary,
    /// Scanned for keyword counts.
    Keywords,
}

pub struct NewsDesk {
    summary_sources: Vec<Box<dyn NewsSource>>,
    keyword_sources: Vec<Box<dyn NewsSource>>,
    summarizer: Box<dyn Summarizer>,
    digests: TtlCache<NewsFeed, NewsDigest>,
    summaries: TtlCache<blake3::Hash, String>,
}

impl NewsDesk {
    pub fn new(
        summary_sources: Vec<Box<dyn NewsSource>>,
        keyword_sources: Vec<Box<dyn NewsSource>>,
        summarizer: Box<dyn Summarizer>,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            summary_sources,
            keyword_sources,
            summarizer,
            digests: TtlCache::new(cache.news_ttl()),
            summaries: TtlCache::new(cache.summary_ttl()),
        }
    }

    /// One `HttpNewsSource` per URL; URLs whose client cannot be built are
    /// skipped with a warning.
    pub fn http_sources(urls: &[String]) -> Vec<Box<dyn NewsSource>> {
        urls.iter()
            .filter_map(|url| match HttpNewsSource::new(url.as_str()) {
                Ok(source) => Some(Box::new(source) as Box<dyn NewsSource>),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "skipping news source");
                    None
                }
            })
            .collect()
    }

    pub fn digest(&self, feed: NewsFeed) -> NewsDigest {
        if let Some(hit) = self.digests.get(&feed) {
            tracing::debug!(?feed, "news cache hit");
            return hit;
        }
        let sources = match feed {
            NewsFeed::Summary => &self.summary_sources,
            NewsFeed::Keywords => &self.keyword_sources,
        };
        let digest = gather_news(sources);
        self.digests.insert(feed, digest.clone());
        digest
    }

    /// Summary of the current summary-feed digest. Failed requests are not cached.
    pub fn summary(&self) -> Result<String, SummaryError> {
        let digest = self.digest(NewsFeed::Summary);
        let key = blake3::hash(digest.text.as_bytes());
        self.summaries
            .get_or_try_insert_with(&key, || self.summarizer.summarize(&digest.text))
    }

    pub fn keywords(&self, keywords: &[String]) -> KeywordReport {
        KeywordReport::from_digest(&self.digest(NewsFeed::Keywords), keywords)
    }

    /// The "refresh" action.
    pub fn clear_cache(&self) {
        self.digests.clear();
        self.summaries.clear();
    }
}

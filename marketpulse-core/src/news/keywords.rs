//! Keyword frequency in current news, plus a synthetic look-back.
//!
//! Only today's counts are measured. Earlier days are produced by a
//! deterministic decay heuristic from today's counts and are always flagged
//! `synthetic`.

use super::source::{gather_news, NewsDigest, NewsSource, SourceOutcome};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Case-insensitive, non-overlapping occurrence count of each keyword.
/// Empty keywords count zero.
pub fn count_keywords(text: &str, keywords: &[String]) -> BTreeMap<String, usize> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|kw| {
            let needle = kw.to_lowercase();
            let count = if needle.is_empty() {
                0
            } else {
                haystack.matches(needle.as_str()).count()
            };
            (kw.clone(), count)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReport {
    /// Counts summed over contributing sources. `None` when no source
    /// returned text, so "unmeasured" is never shown as a number.
    pub current: Option<BTreeMap<String, usize>>,
    pub outcomes: Vec<SourceOutcome>,
}

impl KeywordReport {
    pub fn from_digest(digest: &NewsDigest, keywords: &[String]) -> Self {
        let current = (!digest.texts.is_empty()).then(|| {
            let mut totals: BTreeMap<String, usize> = keywords.iter().map(|k| (k.clone(), 0)).collect();
            for text in &digest.texts {
                for (kw, n) in count_keywords(text, keywords) {
                    *totals.entry(kw).or_insert(0) += n;
                }
            }
            totals
        });
        Self {
            current,
            outcomes: digest.outcomes.clone(),
        }
    }
}

pub fn track_keywords(sources: &[Box<dyn NewsSource>], keywords: &[String]) -> KeywordReport {
    let report = KeywordReport::from_digest(&gather_news(sources), keywords);
    if report.current.is_none() {
        tracing::warn!(sources = sources.len(), "no news source contributed; keyword counts unavailable");
    }
    report
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPoint {
    pub date: NaiveDate,
    pub keyword: String,
    pub count: usize,
    /// False only for today's measured count.
    pub synthetic: bool,
}

/// Deterministic trend factor in [0.70, 1.29] for a (date, keyword) pair.
fn trend_factor(date: NaiveDate, keyword: &str) -> f64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(keyword.as_bytes());
    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash.as_bytes()[..8]);
    0.7 + (u64::from_le_bytes(seed) % 60) as f64 / 100.0
}

/// Today's measured point plus `days - 1` synthetic earlier points per
/// keyword, oldest first.
///
/// Each synthetic count is `floor(today * trend * decay)` where
/// `decay = 1 - days_ago / (2 * days)`.
pub fn synthetic_history(
    current: &BTreeMap<String, usize>,
    days: u32,
    today: NaiveDate,
) -> Vec<KeywordPoint> {
    let mut points = Vec::with_capacity(current.len() * days.max(1) as usize);
    for (keyword, &base) in current {
        for days_ago in (1..days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(days_ago))) else {
                continue;
            };
            let decay = 1.0 - f64::from(days_ago) / (f64::from(days) * 2.0);
            let count = (base as f64 * trend_factor(date, keyword) * decay).floor().max(0.0) as usize;
            points.push(KeywordPoint {
                date,
                keyword: keyword.clone(),
                count,
                synthetic: true,
            });
        }
        points.push(KeywordPoint {
            date: today,
            keyword: keyword.clone(),
            count: base,
            synthetic: false,
        });
    }
    points
}

//! News sources and plain-text extraction.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("{name}: request failed: {reason}")]
    Fetch { name: String, reason: String },

    #[error("{name}: HTTP {status}")]
    Status { name: String, status: u16 },

    #[error("{name}: no readable text")]
    Empty { name: String },
}

/// Anything that yields a block of readable news text.
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_text(&self) -> Result<String, NewsError>;
}

/// A web page fetched over HTTP and reduced to its visible text.
pub struct HttpNewsSource {
    name: String,
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpNewsSource {
    pub fn new(url: impl Into<String>) -> Result<Self, NewsError> {
        let url = url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) marketpulse/0.1")
            .build()
            .map_err(|e| NewsError::Fetch {
                name: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: url.clone(),
            url,
            client,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl NewsSource for HttpNewsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_text(&self) -> Result<String, NewsError> {
        let fetch_err = |e: reqwest::Error| NewsError::Fetch {
            name: self.name.clone(),
            reason: e.to_string(),
        };
        let resp = self.client.get(&self.url).send().map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                name: self.name.clone(),
                status: status.as_u16(),
            });
        }
        let html = resp.text().map_err(fetch_err)?;
        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(NewsError::Empty {
                name: self.name.clone(),
            });
        }
        Ok(text)
    }
}

/// Visible text of an HTML document: comments, `<script>` and `<style>`
/// bodies and all tags removed, common entities decoded, whitespace
/// collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets identical to `html`.
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len() / 2);
    let mut pos = 0;

    while let Some(rel) = html[pos..].find('<') {
        let start = pos + rel;
        out.push_str(&html[pos..start]);
        out.push(' ');

        if lower[start..].starts_with("<!--") {
            pos = lower[start..]
                .find("-->")
                .map_or(html.len(), |i| start + i + 3);
            continue;
        }

        let Some(end_rel) = html[start..].find('>') else {
            pos = html.len();
            break;
        };
        let tag_end = start + end_rel + 1;
        let name = tag_name(&lower[start + 1..tag_end - 1]);
        pos = tag_end;

        if name == "script" || name == "style" {
            let closing = format!("</{name}");
            pos = match lower[tag_end..].find(&closing) {
                Some(i) => {
                    let close_start = tag_end + i;
                    lower[close_start..]
                        .find('>')
                        .map_or(html.len(), |j| close_start + j + 1)
                }
                None => html.len(),
            };
        }
    }
    out.push_str(&html[pos..]);

    collapse_whitespace(&decode_entities(&out))
}

fn tag_name(inner: &str) -> &str {
    let end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    &inner[..end]
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last so "&amp;lt;" decodes to "&lt;", not "<".
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// What happened to one source during a gather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SourceOutcome {
    Ok { name: String, chars: usize },
    Failed { name: String, error: String },
}

impl SourceOutcome {
    pub fn name(&self) -> &str {
        match self {
            SourceOutcome::Ok { name, .. } | SourceOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SourceOutcome::Ok { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Contributing texts joined with a blank line.
    pub text: String,
    /// One text per contributing source, in source order.
    pub texts: Vec<String>,
    pub outcomes: Vec<SourceOutcome>,
}

impl NewsDigest {
    /// Number of sources that returned text.
    pub fn contributing(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Fetch every source concurrently. A failing source is recorded and
/// skipped; it never fails the gather.
pub fn gather_news(sources: &[Box<dyn NewsSource>]) -> NewsDigest {
    let fetched: Vec<(String, Result<String, NewsError>)> = sources
        .par_iter()
        .map(|source| (source.name().to_string(), source.fetch_text()))
        .collect();

    let mut digest = NewsDigest::default();
    for (name, result) in fetched {
        match result {
            Ok(text) => {
                tracing::debug!(source = %name, chars = text.chars().count(), "news source fetched");
                digest.outcomes.push(SourceOutcome::Ok {
                    name,
                    chars: text.chars().count(),
                });
                digest.texts.push(text);
            }
            Err(e) => {
                tracing::warn!(source = %name, error = %e, "news source failed");
                digest.outcomes.push(SourceOutcome::Failed {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }
    digest.text = digest.texts.join("\n\n");
    digest
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FixedSource {
        pub name: &'static str,
        pub text: Option<&'static str>,
    }

    impl NewsSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch_text(&self) -> Result<String, NewsError> {
            self.text.map(String::from).ok_or_else(|| NewsError::Fetch {
                name: self.name.to_string(),
                reason: "timed out".into(),
            })
        }
    }

    #[test]
    fn strips_tags_scripts_and_styles() {
        let html = r#"<html><head><style>p { color: red; }</style>
            <script type="text/javascript">var fed = "inflation";</script></head>
            <body><h1>Stocks  rally</h1><!-- ad slot --><p>Fed &amp; rates&nbsp;today</p></body></html>"#;
        assert_eq!(html_to_text(html), "Stocks rally Fed & rates today");
    }

    #[test]
    fn decodes_entities_once() {
        assert_eq!(html_to_text("a &lt;b&gt; &quot;c&quot; d&#39;s &amp;lt;"), "a <b> \"c\" d's &lt;");
    }

    #[test]
    fn unterminated_markup_is_dropped() {
        assert_eq!(html_to_text("text <script>never closed"), "text");
        assert_eq!(html_to_text("before <div"), "before");
    }

    #[test]
    fn gather_joins_contributing_sources_in_order() {
        let sources: Vec<Box<dyn NewsSource>> = vec![
            Box::new(FixedSource { name: "a", text: Some("first") }),
            Box::new(FixedSource { name: "b", text: None }),
            Box::new(FixedSource { name: "c", text: Some("third") }),
        ];
        let digest = gather_news(&sources);
        assert_eq!(digest.text, "first\n\nthird");
        assert_eq!(digest.contributing(), 2);
        assert_eq!(digest.outcomes[0], SourceOutcome::Ok { name: "a".into(), chars: 5 });
        assert!(!digest.outcomes[1].is_ok());
        assert_eq!(digest.outcomes[1].name(), "b");
    }

    #[test]
    fn gather_with_no_sources_is_empty() {
        let digest = gather_news(&[]);
        assert!(digest.is_empty());
        assert_eq!(digest.contributing(), 0);
        assert_eq!(digest.text, "");
    }
}

//! AI macro summary over gathered news text.

use crate::config::SummaryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summarizer not configured: set {env_var} to enable AI summaries")]
    NotConfigured { env_var: String },

    #[error("summary request failed: {0}")]
    Request(String),

    #[error("summary request returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summary response had no content")]
    EmptyResponse,
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, SummaryError>;
}

/// The analyst prompt wrapped around (already truncated) news text.
pub fn analyst_prompt(news: &str) -> String {
    format!(
        "You are a financial market analyst. Analyze the following market news and provide \
         a concise macro summary covering:\n\
         1. Overall market sentiment (bullish/bearish/neutral)\n\
         2. Key market drivers and themes\n\
         3. Major sector movements\n\
         4. Important upcoming events or concerns\n\
         5. Brief outlook\n\n\
         Keep the summary under 300 words and focus on actionable insights.\n\n\
         News content:\n{news}\n"
    )
}

/// First `max_chars` characters of `text` (never splits a code point).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String, SummaryError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(SummaryError::EmptyResponse)
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiSummarizer {
    client: reqwest::blocking::Client,
    config: SummaryConfig,
    api_key: Option<String>,
}

impl OpenAiSummarizer {
    /// Reads the API key from the environment variable named in `config`.
    /// A missing key is not an error here; `summarize` reports it.
    pub fn from_config(config: &SummaryConfig) -> Result<Self, SummaryError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &SummaryConfig, api_key: Option<String>) -> Result<Self, SummaryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SummaryError::Request(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_completion_tokens: self.config.max_completion_tokens,
        }
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        let Some(api_key) = &self.api_key else {
            return Err(SummaryError::NotConfigured {
                env_var: self.config.api_key_env.clone(),
            });
        };

        let prompt = analyst_prompt(truncate_chars(text, self.config.max_input_chars));
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        tracing::debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "requesting summary");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(&prompt))
            .send()
            .map_err(|e| SummaryError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, 200).to_string(),
            });
        }

        resp.json::<ChatResponse>()
            .map_err(|e| SummaryError::Request(format!("malformed response: {e}")))?
            .into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("€€€€", 2), "€€");
        assert_eq!(truncate_chars("", 4), "");
    }

    #[test]
    fn prompt_embeds_news() {
        let prompt = analyst_prompt("Stocks rallied.");
        assert!(prompt.starts_with("You are a financial market analyst."));
        assert!(prompt.contains("5. Brief outlook"));
        assert!(prompt.ends_with("News content:\nStocks rallied.\n"));
    }

    #[test]
    fn missing_key_is_not_configured() {
        let summarizer = OpenAiSummarizer::with_key(&SummaryConfig::default(), None).unwrap();
        assert!(!summarizer.is_configured());
        let err = summarizer.summarize("news").unwrap_err();
        assert!(matches!(err, SummaryError::NotConfigured { ref env_var } if env_var == "OPENAI_API_KEY"));
    }

    #[test]
    fn request_body_shape() {
        let summarizer = OpenAiSummarizer::with_key(&SummaryConfig::default(), Some("k".into())).unwrap();
        let json = serde_json::to_value(summarizer.request_body("hello")).unwrap();
        assert_eq!(json["model"], "gpt-5");
        assert_eq!(json["max_completion_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_content_extraction() {
        let ok: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  Bullish.  "}}]}"#).unwrap();
        assert_eq!(ok.into_content().unwrap(), "Bullish.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(empty.into_content(), Err(SummaryError::EmptyResponse)));

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(null.into_content(), Err(SummaryError::EmptyResponse)));
    }
}

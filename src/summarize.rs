use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You summarize scraped web content for product research. \
Produce a concise summary that keeps concrete facts: product names, model numbers, \
prices, measurements and user sentiment. Omit navigation text and boilerplate.";

/// Produces a condensed rendition of converted Markdown. The dispatcher
/// holds this behind a trait object so tests can substitute a canned
/// implementation and no test ever talks to a live model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, markdown: &str) -> Result<String>;
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
/// An empty API key means a key-less local endpoint; no auth header is sent.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_input_chars: usize,
}

impl OpenAiSummarizer {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            max_input_chars: 48_000,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, markdown: &str) -> Result<String> {
        let input = truncate_chars(markdown, self.max_input_chars);
        if input.len() < markdown.len() {
            debug!(
                full = markdown.len(),
                sent = input.len(),
                "truncated summarizer input"
            );
        }

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": input},
            ],
            "temperature": 0.2,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .context("summary request failed")?
            .error_for_status()
            .context("summary endpoint returned an error status")?;

        let payload: Value = response
            .json()
            .await
            .context("summary response was not JSON")?;
        payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow!("chat completion missing choices[0].message.content"))
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

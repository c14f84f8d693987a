use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::{FetchBackend, FetchError};

/// External crawler API backend. POSTs the target URL with bearer auth and
/// expects a JSON array whose first element carries a `content` field.
pub struct SpiderFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SpiderFetcher {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
impl FetchBackend for SpiderFetcher {
    fn name(&self) -> &'static str {
        "spider"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty());
        let api_key = match api_key {
            Some(k) => k,
            None => {
                warn!("spider backend requested but SPIDER_API_KEY is not configured");
                return Err(FetchError::malformed("missing spider API key"));
            }
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&json!({ "url": url }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Past this point the request succeeded; a body that will not
        // decode is a shape mismatch, not a transport failure.
        let payload: Value = response
            .json()
            .await
            .map_err(|e| FetchError::malformed(format!("non-JSON body: {e}")))?;
        let content = payload
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item.get("content"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FetchError::malformed("expected [{content}, ..] array"))?;
        Ok(content.to_string())
    }
}

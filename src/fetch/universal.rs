use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::{FetchBackend, FetchError};

/// Remote-render backend: POSTs a render job with basic auth and pulls the
/// raw page source back out of `results[0].content`. The API has shipped
/// that field both as a bare string and as an `{html}` object, so both
/// shapes are accepted; anything else fails closed.
pub struct UniversalFetcher {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl UniversalFetcher {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            client,
            endpoint,
            credentials,
            timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait]
impl FetchBackend for UniversalFetcher {
    fn name(&self) -> &'static str {
        "universal"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let (username, password) = match &self.credentials {
            Some(creds) => creds,
            None => {
                warn!("universal backend requested but Oxylabs credentials are not configured");
                return Err(FetchError::malformed("missing universal credentials"));
            }
        };

        let body = json!({
            "source": "universal",
            "url": url,
            "parse": false,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(username, Some(password))
            .json(&body)
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
            .get("results")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("content"))
            .ok_or_else(|| FetchError::malformed("expected results[0].content"))?;

        match content {
            Value::String(html) if !html.is_empty() => Ok(html.clone()),
            Value::Object(map) => map
                .get("html")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .ok_or_else(|| FetchError::malformed("content object missing html")),
            _ => Err(FetchError::malformed("unsupported content shape")),
        }
    }
}

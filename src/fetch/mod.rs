pub mod batch;
pub mod direct;
pub mod headers;
pub mod spider;
pub mod universal;
pub mod youtube;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::classify::{classify, UrlKind};
use crate::core::app_state::AppState;
use crate::core::types::{FetchOptions, OutputFormat};
use crate::markdown::html_to_markdown;
use crate::metrics::{CounterEvent, CounterStatus};
use crate::reddit;

pub use direct::DirectFetcher;
pub use spider::SpiderFetcher;
pub use universal::UniversalFetcher;
pub use youtube::TranscriptFetcher;

/// Internal failure taxonomy. Never crosses the public fetch surface;
/// the outcome recorder flattens it to `None` and a metric label.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non-2xx response with the status retained for metrics.
    #[error("http status {0}")]
    Status(u16),
    /// No usable response at all (DNS, connect, timeout, body read).
    #[error("transport: {0}")]
    Transport(String),
    /// A response arrived but did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Transport(err.to_string()),
        }
    }

    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "http",
            Self::Transport(_) => "transport",
            Self::Malformed(_) => "format",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// One way to turn a URL into a text payload. Implementations never panic;
/// every failure mode is a `FetchError` variant.
#[async_trait]
pub trait FetchBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Run a backend, log the outcome, emit a counter event, and flatten the
/// result to `Option`. Every backend call in the dispatcher goes through
/// here so the metric stream stays complete.
async fn run_backend(
    state: &Arc<AppState>,
    backend: &Arc<dyn FetchBackend>,
    url: &str,
) -> Option<String> {
    let name = backend.name();
    match backend.fetch(url).await {
        Ok(payload) => {
            info!(backend = name, url, bytes = payload.len(), "fetch succeeded");
            state.counters.record(CounterEvent {
                backend: name,
                status: CounterStatus::Success,
                error: None,
                status_code: None,
            });
            Some(payload)
        }
        Err(err) => {
            warn!(backend = name, url, %err, "fetch failed");
            state.counters.record(CounterEvent {
                backend: name,
                status: CounterStatus::Error,
                error: Some(err.kind()),
                status_code: err.status_code(),
            });
            None
        }
    }
}

/// Fetch one URL and normalize it per `options`.
///
/// Routing: YouTube URLs yield the transcript regardless of format (already
/// plain text); Reddit URLs go through the universal backend and the Reddit
/// renderer (ignoring `use_external`); everything else fetches directly or
/// via the external crawler, then converts per `options.format`. Every
/// failure path returns `None`; reasons are logged, never surfaced.
pub async fn fetch_url(state: &Arc<AppState>, url: &str, options: FetchOptions) -> Option<String> {
    match classify(url) {
        UrlKind::Youtube { video_id } => {
            info!(url, video_id, "routing to transcript backend");
            fetch_payload(state, &state.transcript, &video_id, url).await
        }
        UrlKind::Reddit { json_url } => {
            info!(url, json_url, "routing to reddit renderer");
            let payload = fetch_payload(state, &state.universal, &json_url, &json_url).await?;
            let listing: Value = match serde_json::from_str(&payload) {
                Ok(v) => v,
                Err(err) => {
                    warn!(url, %err, "reddit payload was not JSON");
                    return None;
                }
            };
            let markdown = reddit::reddit_json_to_markdown(&listing);
            Some(reddit::strip_links(&markdown))
        }
        UrlKind::Generic => {
            let backend = if options.use_external {
                &state.spider
            } else {
                &state.direct
            };
            let html = fetch_payload(state, backend, url, url).await?;
            if options.save_debug {
                state.debug_sink.dump(url, "html", &html);
            }
            if options.format == OutputFormat::Raw {
                return Some(html);
            }

            let markdown = match html_to_markdown(&html) {
                Some(md) => md,
                None => {
                    warn!(url, "conversion produced no content");
                    return None;
                }
            };
            if options.save_debug {
                state.debug_sink.dump(url, "md", &markdown);
            }

            match options.format {
                OutputFormat::Markdown => Some(markdown),
                OutputFormat::Summary => summarize(state, url, &markdown).await,
                OutputFormat::Raw => unreachable!("raw handled above"),
            }
        }
    }
}

/// Cache-through backend call: serve the raw payload from the scrape cache
/// when fresh, otherwise run the backend and cache its successful output.
/// Conversion always re-runs, so one cached payload serves every format.
///
/// `target` is what the backend fetches (a URL, or a video id for the
/// transcript backend); `cache_key` is always a URL so the cache keyspace
/// stays uniform.
async fn fetch_payload(
    state: &Arc<AppState>,
    backend: &Arc<dyn FetchBackend>,
    target: &str,
    cache_key: &str,
) -> Option<String> {
    if let Some(cached) = state.cache.get(cache_key) {
        if let Some(payload) = cached.as_str() {
            return Some(payload.to_string());
        }
        warn!(cache_key, "cache entry had an unexpected shape, refetching");
    }
    let payload = run_backend(state, backend, target).await?;
    state.cache.set(cache_key, Value::String(payload.clone()));
    Some(payload)
}

async fn summarize(state: &Arc<AppState>, url: &str, markdown: &str) -> Option<String> {
    let summarizer = match &state.summarizer {
        Some(s) => s,
        None => {
            warn!(url, "summary requested but no summarizer is configured");
            return None;
        }
    };
    match summarizer.summarize(markdown).await {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!(url, %err, "summarization failed");
            None
        }
    }
}

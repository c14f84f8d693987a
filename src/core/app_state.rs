use std::sync::Arc;

use crate::cache::ScrapeCache;
use crate::core::config::MarksiftConfig;
use crate::debug_files::DebugSink;
use crate::fetch::{DirectFetcher, FetchBackend, SpiderFetcher, TranscriptFetcher, UniversalFetcher};
use crate::metrics::{CounterSink, NoopCounter};
use crate::summarize::{OpenAiSummarizer, Summarizer};

/// Shared process state threaded through every fetch as `&Arc<AppState>`.
///
/// Backends, counters and the summarizer live behind trait objects so tests
/// can swap any of them for in-memory doubles via the `with_*` builders.
#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub config: Arc<MarksiftConfig>,
    pub cache: Arc<ScrapeCache>,
    pub counters: Arc<dyn CounterSink>,
    pub debug_sink: Arc<DebugSink>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub direct: Arc<dyn FetchBackend>,
    pub spider: Arc<dyn FetchBackend>,
    pub universal: Arc<dyn FetchBackend>,
    pub transcript: Arc<dyn FetchBackend>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache_enabled", &self.cache.enabled())
            .field("summarizer_configured", &self.summarizer.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(crate::core::config::load_config())
    }

    pub fn with_config(config: MarksiftConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("reqwest client build");

        let config = Arc::new(config);
        let cache = Arc::new(ScrapeCache::new(
            config.resolve_cache_dir(),
            config.resolve_cache_ttl_secs(),
            config.resolve_enable_cache(),
        ));
        let debug_sink = Arc::new(DebugSink::new(config.resolve_debug_dir(), true));

        let summarizer: Option<Arc<dyn Summarizer>> =
            config.summary.resolve_api_key().map(|key| {
                Arc::new(OpenAiSummarizer::new(
                    http_client.clone(),
                    &config.summary.resolve_base_url(),
                    key,
                    config.summary.resolve_model(),
                )) as Arc<dyn Summarizer>
            });

        let direct: Arc<dyn FetchBackend> = Arc::new(DirectFetcher::new(http_client.clone()));
        let spider: Arc<dyn FetchBackend> = Arc::new(SpiderFetcher::new(
            http_client.clone(),
            config.resolve_spider_endpoint(),
            config.resolve_spider_api_key(),
        ));
        let universal: Arc<dyn FetchBackend> = Arc::new(UniversalFetcher::new(
            http_client.clone(),
            config.resolve_universal_endpoint(),
            config.resolve_oxylabs_credentials(),
        ));
        let transcript: Arc<dyn FetchBackend> =
            Arc::new(TranscriptFetcher::new(http_client.clone()));

        Self {
            http_client,
            config,
            cache,
            counters: Arc::new(NoopCounter),
            debug_sink,
            summarizer,
            direct,
            spider,
            universal,
            transcript,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ScrapeCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_counters(mut self, counters: Arc<dyn CounterSink>) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<DebugSink>) -> Self {
        self.debug_sink = sink;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_direct(mut self, backend: Arc<dyn FetchBackend>) -> Self {
        self.direct = backend;
        self
    }

    pub fn with_spider(mut self, backend: Arc<dyn FetchBackend>) -> Self {
        self.spider = backend;
        self
    }

    pub fn with_universal(mut self, backend: Arc<dyn FetchBackend>) -> Self {
        self.universal = backend;
        self
    }

    pub fn with_transcript(mut self, backend: Arc<dyn FetchBackend>) -> Self {
        self.transcript = backend;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

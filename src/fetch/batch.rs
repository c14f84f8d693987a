use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::core::app_state::AppState;
use crate::core::types::FetchOptions;

pub const DEFAULT_MAX_CONCURRENT: usize = 20;

/// Fetch a batch of URLs in strictly sequential windows of
/// `max_concurrent`. Each window's tasks run concurrently and the whole
/// window joins before the next starts, so peak outbound connections are
/// bounded deterministically. One URL failing (or even panicking) never
/// affects its siblings; duplicate URLs collapse to the last result.
pub async fn fetch_batch(
    state: &Arc<AppState>,
    urls: &[String],
    options: FetchOptions,
    max_concurrent: usize,
) -> HashMap<String, Option<String>> {
    let window_size = max_concurrent.max(1);
    let mut results = HashMap::with_capacity(urls.len());
    let total_windows = urls.len().div_ceil(window_size);

    for (index, window) in urls.chunks(window_size).enumerate() {
        info!(
            window = index + 1,
            total_windows,
            urls = window.len(),
            "fetching batch window"
        );

        let handles: Vec<_> = window
            .iter()
            .map(|url| {
                let state = Arc::clone(state);
                let url = url.clone();
                tokio::spawn(async move { super::fetch_url(&state, &url, options).await })
            })
            .collect();

        for (url, joined) in window.iter().zip(join_all(handles).await) {
            let content = match joined {
                Ok(content) => content,
                Err(err) => {
                    // A panicking task is contained at the join boundary.
                    warn!(url, %err, "fetch task aborted");
                    None
                }
            };
            results.insert(url.clone(), content);
        }
    }

    results
}

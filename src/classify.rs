/// Retrieval path for a URL, decided purely from its shape.
///
/// Classification never touches the network: YouTube watch URLs carry their
/// video id in the path/query, Reddit threads expose a machine-readable
/// listing by appending `.json`, and everything else goes through the
/// generic HTML pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlKind {
    Youtube { video_id: String },
    Reddit { json_url: String },
    Generic,
}

pub fn classify(url: &str) -> UrlKind {
    if let Some(video_id) = extract_youtube_id(url) {
        return UrlKind::Youtube { video_id };
    }
    if url.contains("reddit.com") {
        return UrlKind::Reddit {
            json_url: reddit_json_url(url),
        };
    }
    UrlKind::Generic
}

/// Extract a YouTube video id from a watch URL or a `youtu.be` short link.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    if let Some(rest) = url.split("youtube.com/watch?v=").nth(1) {
        let id = rest.split('&').next().unwrap_or(rest);
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    if url.contains("youtu.be/") {
        let id = url.rsplit('/').next()?.split('?').next()?;
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    None
}

/// Rewrite a Reddit thread URL to its JSON listing endpoint.
/// Idempotent: a URL that already ends in `.json` is returned unchanged.
pub fn reddit_json_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(".json") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_url_yields_video_id() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=abc123&t=5"),
            UrlKind::Youtube {
                video_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn youtube_short_link_yields_video_id() {
        assert_eq!(
            extract_youtube_id("https://youtu.be/xyz789"),
            Some("xyz789".to_string())
        );
    }

    #[test]
    fn non_youtube_url_has_no_video_id() {
        assert_eq!(extract_youtube_id("https://example.com/watch"), None);
        assert_eq!(classify("https://example.com/page"), UrlKind::Generic);
    }

    #[test]
    fn reddit_rewrite_appends_json_once() {
        let rewritten = reddit_json_url("https://reddit.com/r/test/comments/1/");
        assert_eq!(rewritten, "https://reddit.com/r/test/comments/1.json");
        // Rewriting the rewritten URL must not double the suffix.
        assert_eq!(reddit_json_url(&rewritten), rewritten);
    }

    #[test]
    fn reddit_url_classifies_with_json_endpoint() {
        match classify("https://www.reddit.com/r/keurig/comments/ytv37m/ksupreme_vs_kelite/") {
            UrlKind::Reddit { json_url } => {
                assert!(json_url.ends_with("ksupreme_vs_kelite.json"));
            }
            other => panic!("expected Reddit classification, got {other:?}"),
        }
    }
}

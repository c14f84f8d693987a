use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchBackend, FetchError};

/// Caption transcript backend. Takes a video id (not a full URL), pulls the
/// English caption track from the timedtext endpoint, and flattens the
/// segments into one plain-text paragraph.
pub struct TranscriptFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl TranscriptFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(15),
        }
    }
}

#[async_trait]
impl FetchBackend for TranscriptFetcher {
    fn name(&self) -> &'static str {
        "transcript"
    }

    async fn fetch(&self, video_id: &str) -> Result<String, FetchError> {
        let endpoint = format!(
            "https://www.youtube.com/api/timedtext?lang=en&v={video_id}"
        );
        let response = self
            .client
            .get(&endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let xml = response.text().await.map_err(FetchError::from_reqwest)?;
        // The endpoint answers 200 with an empty body when no track exists.
        if xml.trim().is_empty() {
            return Err(FetchError::malformed("no caption track for video"));
        }
        transcript_from_xml(&xml)
            .ok_or_else(|| FetchError::malformed("timedtext response had no text segments"))
    }
}

/// Extract `<text>` segments, entity-decode them, join with `". "` and
/// make sure the result ends with a period.
fn transcript_from_xml(xml: &str) -> Option<String> {
    static SEGMENT: OnceLock<regex::Regex> = OnceLock::new();
    let segment = SEGMENT
        .get_or_init(|| regex::Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("static regex"));

    let segments: Vec<String> = segment
        .captures_iter(xml)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str();
            let decoded = html_escape::decode_html_entities(raw);
            let flat = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
            (!flat.is_empty()).then_some(flat)
        })
        .collect();

    if segments.is_empty() {
        return None;
    }
    let mut transcript = segments.join(". ");
    if !transcript.ends_with('.') {
        transcript.push('.');
    }
    Some(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_join_with_period_space() {
        let xml = r#"<transcript>
            <text start="0.0" dur="2.1">hello there</text>
            <text start="2.1" dur="3.0">general remarks</text>
        </transcript>"#;
        assert_eq!(
            transcript_from_xml(xml).unwrap(),
            "hello there. general remarks."
        );
    }

    #[test]
    fn entities_are_decoded_and_whitespace_flattened() {
        let xml = "<transcript><text>it&#39;s a\ntest &amp; more</text></transcript>";
        assert_eq!(transcript_from_xml(xml).unwrap(), "it's a test & more.");
    }

    #[test]
    fn existing_trailing_period_is_not_doubled() {
        let xml = "<transcript><text>done.</text></transcript>";
        assert_eq!(transcript_from_xml(xml).unwrap(), "done.");
    }

    #[test]
    fn no_segments_yields_none() {
        assert!(transcript_from_xml("<transcript></transcript>").is_none());
    }
}

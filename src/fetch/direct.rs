use std::time::Duration;

use async_trait::async_trait;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

use url::Url;

use super::headers;
use super::{FetchBackend, FetchError};

/// Plain HTTP GET with rotated browser headers and byte-level charset
/// sniffing. The cheapest backend and the default for generic URLs.
pub struct DirectFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl DirectFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait]
impl FetchBackend for DirectFetcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::malformed(format!("invalid URL: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::malformed("URL must use HTTP or HTTPS"));
        }

        let mut request = self
            .client
            .get(url)
            .header("User-Agent", headers::random_user_agent())
            .timeout(self.timeout);
        for (name, value) in headers::browser_headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(FetchError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Decode from raw bytes rather than trusting the content-type
        // header; plenty of pages lie about or omit their charset.
        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Ok(decode_bytes(&bytes))
    }
}

/// Sniff the payload's encoding and decode it, falling back to lossy
/// UTF-8 when detection is inconclusive.
fn decode_bytes(bytes: &[u8]) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding: &'static Encoding = detector.guess(None, true);
    let (decoded, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = actual.name(), "charset decode had errors, keeping lossy output");
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bytes_pass_through() {
        assert_eq!(decode_bytes("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn windows_1252_is_sniffed() {
        // "café" in windows-1252: é is 0xE9.
        let bytes = [b'c', b'a', b'f', 0xE9, b' ', b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_bytes(&bytes), "café café");
    }
}

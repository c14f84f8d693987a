use serde::{Deserialize, Serialize};

/// What shape the caller wants per URL.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Unconverted fetch payload (HTML, or platform JSON rendered as-is).
    Raw,
    /// HTML converted to filtered Markdown.
    #[default]
    Markdown,
    /// Converted Markdown condensed through the summarizer.
    Summary,
}

/// Per-request knobs carried alongside a URL through the dispatcher.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct FetchOptions {
    #[serde(default)]
    pub format: OutputFormat,
    /// Persist raw HTML and converted Markdown to the debug directory.
    #[serde(default)]
    pub save_debug: bool,
    /// Route generic URLs through the external crawler API instead of
    /// direct HTTP. Ignored for YouTube and Reddit URLs.
    #[serde(default)]
    pub use_external: bool,
}

impl FetchOptions {
    pub fn markdown() -> Self {
        Self::default()
    }

    pub fn raw() -> Self {
        Self {
            format: OutputFormat::Raw,
            ..Self::default()
        }
    }
}

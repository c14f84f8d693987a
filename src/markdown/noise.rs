/// Tags whose subtrees are never page content.
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// Substrings in a `class` or `id` attribute that mark an element as
/// boilerplate (nav chrome, consent banners, ad slots, comment widgets).
const SKIP_IDENTIFIERS: &[&str] = &[
    "cookie",
    "banner",
    "ad-",
    "advertisement",
    "popup",
    "modal",
    "sidebar",
    "menu",
    "nav-",
    "footer",
    "header",
    "comment",
];

/// Lowercased substrings that mark an emitted line as noise: script/style
/// remnants, tracker hosts, serialized-object fragments, and legal
/// boilerplate phrases.
const NOISE_SUBSTRINGS: &[&str] = &[
    "var ",
    "function()",
    ".js",
    ".css",
    "google-analytics",
    "disqus",
    "{",
    "}",
    "undefined",
    "null",
    "nan",
    "cookie",
    "privacy policy",
    "terms of service",
    "all rights reserved",
    "copyright ©",
];

/// Noise-rejection configuration for the converter.
///
/// The lists are data rather than hard invariants: callers tuning the
/// converter for a specific corpus can extend or replace them without
/// touching the walk itself.
#[derive(Clone, Debug)]
pub struct NoiseFilter {
    pub skip_tags: Vec<String>,
    pub skip_identifiers: Vec<String>,
    pub noise_substrings: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            skip_tags: SKIP_TAGS.iter().map(|s| s.to_string()).collect(),
            skip_identifiers: SKIP_IDENTIFIERS.iter().map(|s| s.to_string()).collect(),
            noise_substrings: NOISE_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NoiseFilter {
    pub fn skips_tag(&self, tag: &str) -> bool {
        self.skip_tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match against a class/id attribute value.
    pub fn skips_identifier(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.skip_identifiers.iter().any(|p| value.contains(p.as_str()))
    }

    /// Case-insensitive substring match against an emitted line.
    pub fn is_noise_line(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.noise_substrings.iter().any(|p| line.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_rejects_known_noise() {
        let filter = NoiseFilter::default();
        assert!(filter.skips_tag("script"));
        assert!(filter.skips_tag("aside"));
        assert!(!filter.skips_tag("article"));

        assert!(filter.skips_identifier("cookie-consent-wrapper"));
        assert!(filter.skips_identifier("TopBanner"));
        assert!(!filter.skips_identifier("product-description"));

        assert!(filter.is_noise_line("Powered by Disqus"));
        assert!(filter.is_noise_line("We use COOKIES to improve your experience"));
        assert!(!filter.is_noise_line("The grinder has a ceramic burr"));
    }
}

// ---------------------------------------------------------------------------
// MarksiftConfig — file-based config loader (marksift.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Summarizer sub-config (mirrors the `summary` key in marksift.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct SummaryConfig {
    /// LLM endpoint — e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1` (Ollama).
    pub llm_base_url: Option<String>,
    /// API key. Never logged. Leave blank for key-less local endpoints.
    pub llm_api_key: Option<String>,
    /// Model name — e.g. `gpt-4o-mini`, `llama3`, `mistral`.
    pub llm_model: Option<String>,
}

impl SummaryConfig {
    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// When `llm_api_key` is explicitly set to `""` in the config file, returns `Some("")`.
    /// This signals "no key required" (Ollama / LM Studio) — summaries proceed without auth.
    /// Returns `None` only when the field is absent from config AND `OPENAI_API_KEY` is unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.llm_api_key {
            return Some(k.trim().to_string());
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.trim().is_empty())
    }

    /// LLM base URL: JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.llm_base_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// Model name: JSON field → `MARKSIFT_SUMMARY_MODEL` env var → `gpt-4o-mini`.
    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.llm_model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var("MARKSIFT_SUMMARY_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }
}

/// Top-level config loaded from `marksift.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct MarksiftConfig {
    pub spider_api_key: Option<String>,
    pub spider_endpoint: Option<String>,
    pub oxylabs_username: Option<String>,
    pub oxylabs_password: Option<String>,
    pub universal_endpoint: Option<String>,
    pub enable_cache: Option<bool>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_dir: Option<String>,
    pub debug_dir: Option<String>,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl MarksiftConfig {
    /// Spider API key: JSON field → `SPIDER_API_KEY` env var → `None`.
    pub fn resolve_spider_api_key(&self) -> Option<String> {
        field_or_env(&self.spider_api_key, "SPIDER_API_KEY")
    }

    /// Spider endpoint: JSON field → `MARKSIFT_SPIDER_ENDPOINT` → the hosted API.
    pub fn resolve_spider_endpoint(&self) -> String {
        field_or_env(&self.spider_endpoint, "MARKSIFT_SPIDER_ENDPOINT")
            .unwrap_or_else(|| "https://api.spider.cloud/crawl".to_string())
    }

    /// Oxylabs credentials: JSON fields → `OXYLABS_USERNAME`/`OXYLABS_PASSWORD` → `None`.
    /// Both must resolve for the universal backend to be usable.
    pub fn resolve_oxylabs_credentials(&self) -> Option<(String, String)> {
        let username = field_or_env(&self.oxylabs_username, "OXYLABS_USERNAME")?;
        let password = field_or_env(&self.oxylabs_password, "OXYLABS_PASSWORD")?;
        Some((username, password))
    }

    /// Universal endpoint: JSON field → `MARKSIFT_UNIVERSAL_ENDPOINT` → the hosted API.
    pub fn resolve_universal_endpoint(&self) -> String {
        field_or_env(&self.universal_endpoint, "MARKSIFT_UNIVERSAL_ENDPOINT")
            .unwrap_or_else(|| "https://realtime.oxylabs.io/v1/queries".to_string())
    }

    /// Whether the scrape cache is on: JSON field → `MARKSIFT_CACHE`
    /// ("0"/"false" disables) → `true`.
    pub fn resolve_enable_cache(&self) -> bool {
        if let Some(b) = self.enable_cache {
            return b;
        }
        std::env::var("MARKSIFT_CACHE")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false"))
            .unwrap_or(true)
    }

    /// Cache TTL: JSON field → `MARKSIFT_CACHE_TTL_SECS` env var → 86400 (one day).
    pub fn resolve_cache_ttl_secs(&self) -> u64 {
        if let Some(n) = self.cache_ttl_secs {
            return n;
        }
        std::env::var("MARKSIFT_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400)
    }

    /// Cache directory: JSON field → `MARKSIFT_CACHE_DIR` env var → `cache`.
    pub fn resolve_cache_dir(&self) -> String {
        field_or_env(&self.cache_dir, "MARKSIFT_CACHE_DIR").unwrap_or_else(|| "cache".to_string())
    }

    /// Debug directory: JSON field → `MARKSIFT_DEBUG_DIR` env var → `debug`.
    pub fn resolve_debug_dir(&self) -> String {
        field_or_env(&self.debug_dir, "MARKSIFT_DEBUG_DIR").unwrap_or_else(|| "debug".to_string())
    }
}

fn field_or_env(field: &Option<String>, env_key: &str) -> Option<String> {
    if let Some(v) = field {
        if !v.trim().is_empty() {
            return Some(v.trim().to_string());
        }
    }
    std::env::var(env_key).ok().filter(|v| !v.trim().is_empty())
}

/// Load `marksift.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `MARKSIFT_CONFIG` env var path
/// 2. `./marksift.json` (process cwd)
/// 3. `../marksift.json` (one level up)
///
/// Missing file → `MarksiftConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `MarksiftConfig::default()`.
pub fn load_config() -> MarksiftConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("marksift.json"),
            std::path::PathBuf::from("../marksift.json"),
        ];
        if let Ok(env_path) = std::env::var("MARKSIFT_CONFIG") {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<MarksiftConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("marksift.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "marksift.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return MarksiftConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    MarksiftConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_endpoints() {
        let cfg = MarksiftConfig::default();
        assert_eq!(cfg.resolve_spider_endpoint(), "https://api.spider.cloud/crawl");
        assert_eq!(
            cfg.resolve_universal_endpoint(),
            "https://realtime.oxylabs.io/v1/queries"
        );
        assert_eq!(cfg.resolve_cache_ttl_secs(), 86_400);
        assert_eq!(cfg.resolve_cache_dir(), "cache");
        assert!(cfg.resolve_enable_cache());
    }

    #[test]
    fn json_fields_win_over_defaults() {
        let cfg: MarksiftConfig = serde_json::from_str(
            r#"{
                "spider_api_key": "sk-test",
                "cache_ttl_secs": 60,
                "enable_cache": false,
                "summary": {"llm_api_key": "", "llm_model": "llama3"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.resolve_spider_api_key().as_deref(), Some("sk-test"));
        assert_eq!(cfg.resolve_cache_ttl_secs(), 60);
        assert!(!cfg.resolve_enable_cache());
        // Explicit empty key means a key-less local endpoint, not "unset".
        assert_eq!(cfg.summary.resolve_api_key().as_deref(), Some(""));
        assert_eq!(cfg.summary.resolve_model(), "llama3");
    }

    #[test]
    fn oxylabs_credentials_require_both_halves() {
        let cfg: MarksiftConfig =
            serde_json::from_str(r#"{"oxylabs_username": "user"}"#).unwrap();
        if std::env::var("OXYLABS_PASSWORD").is_err() {
            assert!(cfg.resolve_oxylabs_credentials().is_none());
        }
    }
}

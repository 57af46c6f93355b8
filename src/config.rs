use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "HealthWise";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Well-known key holding the serialized user record.
pub const USER_STATE_KEY: &str = "healthwise_user";

/// Default OpenAI-compatible endpoint used when no override is set.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model for every generation stage.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";

/// Upper bound for a single generation call, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Get the application data directory
/// ~/HealthWise/ on all platforms, or ./HealthWise when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the SQLite database holding persisted state.
pub fn database_path() -> PathBuf {
    app_data_dir().join("healthwise.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "healthwise_lib=info"
}

/// Connection settings for the external text-generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    /// `None` disables the AI path entirely.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Read settings from the environment.
    ///
    /// - `HEALTHWISE_LLM_BASE_URL` (default: OpenAI v1 API)
    /// - `HEALTHWISE_LLM_API_KEY`, falling back to `OPENAI_API_KEY`
    /// - `HEALTHWISE_LLM_MODEL` (default: `gpt-4`)
    /// - `HEALTHWISE_LLM_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = get("HEALTHWISE_LLM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

        Self {
            base_url: get("HEALTHWISE_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            api_key: get("HEALTHWISE_LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            model: get("HEALTHWISE_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Whether enough is configured to attempt AI generation.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("HealthWise"));
    }

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("healthwise.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn generation_defaults_without_env() {
        let config = GenerationConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS));
        assert!(config.api_key.is_none());
        assert!(!config.is_enabled());
    }

    #[test]
    fn generation_reads_overrides() {
        let config = GenerationConfig::from_lookup(lookup(&[
            ("HEALTHWISE_LLM_BASE_URL", "http://localhost:11434/v1"),
            ("HEALTHWISE_LLM_API_KEY", "sk-test"),
            ("HEALTHWISE_LLM_MODEL", "llama3.1:8b"),
            ("HEALTHWISE_LLM_TIMEOUT_SECS", "15"),
        ]));
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.is_enabled());
    }

    #[test]
    fn openai_key_is_fallback() {
        let config = GenerationConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-openai")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
    }

    #[test]
    fn blank_and_invalid_values_use_defaults() {
        let config = GenerationConfig::from_lookup(lookup(&[
            ("HEALTHWISE_LLM_API_KEY", "   "),
            ("HEALTHWISE_LLM_TIMEOUT_SECS", "0"),
        ]));
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS));
    }
}

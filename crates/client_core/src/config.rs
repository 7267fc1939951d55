use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::query::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub default_page_size: u32,
    pub detail_retry_attempts: u32,
    pub detail_retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".into(),
            request_timeout_secs: 30,
            default_page_size: DEFAULT_PAGE_SIZE,
            detail_retry_attempts: 2,
            detail_retry_delay_ms: 250,
        }
    }
}

impl Settings {
    pub fn detail_retry_delay(&self) -> Duration {
        Duration::from_millis(self.detail_retry_delay_ms)
    }
}

/// Defaults, then `catalog.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings
}

pub fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) else {
        tracing::warn!(path = %path.display(), "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(toml::Value::as_integer) {
        if let Ok(v) = u64::try_from(v) {
            settings.request_timeout_secs = v;
        }
    }
    if let Some(v) = file_cfg.get("default_page_size").and_then(toml::Value::as_integer) {
        if let Ok(v) = u32::try_from(v) {
            settings.default_page_size = v.max(1);
        }
    }
    if let Some(v) = file_cfg.get("detail_retry_attempts").and_then(toml::Value::as_integer) {
        if let Ok(v) = u32::try_from(v) {
            settings.detail_retry_attempts = v;
        }
    }
    if let Some(v) = file_cfg.get("detail_retry_delay_ms").and_then(toml::Value::as_integer) {
        if let Ok(v) = u64::try_from(v) {
            settings.detail_retry_delay_ms = v;
        }
    }
}

/// Environment overrides; `lookup` is injectable for tests.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = lookup("APP__DEFAULT_PAGE_SIZE").and_then(|v| v.parse::<u32>().ok()) {
        settings.default_page_size = v.max(1);
    }
    if let Some(v) = lookup("APP__DETAIL_RETRY_ATTEMPTS").and_then(|v| v.parse().ok()) {
        settings.detail_retry_attempts = v;
    }
    if let Some(v) = lookup("APP__DETAIL_RETRY_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.detail_retry_delay_ms = v;
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn normalizes_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://catalog.example.com/api//"),
            "https://catalog.example.com/api"
        );
        assert_eq!(normalize_base_url("  "), Settings::default().api_base_url);
    }

    #[test]
    fn prefixed_env_wins_over_plain_and_bad_numbers_are_ignored() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_from(&[
                ("CATALOG_API_URL", "http://plain:1/api"),
                ("APP__API_URL", "http://prefixed:2/api"),
                ("APP__DEFAULT_PAGE_SIZE", "many"),
                ("APP__DETAIL_RETRY_ATTEMPTS", "0"),
            ]),
        );
        assert_eq!(settings.api_base_url, "http://prefixed:2/api");
        assert_eq!(settings.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.detail_retry_attempts, 0);
    }

    #[test]
    fn reads_settings_file() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("catalog_settings_test_{suffix}.toml"));
        fs::write(
            &path,
            "api_base_url = \"https://catalog.internal/api\"\ndefault_page_size = 25\ndetail_retry_delay_ms = 0\n",
        )
        .expect("write settings");

        let mut settings = Settings::default();
        apply_file(&mut settings, &path);
        assert_eq!(settings.api_base_url, "https://catalog.internal/api");
        assert_eq!(settings.default_page_size, 25);
        assert_eq!(settings.detail_retry_delay(), Duration::ZERO);
        assert_eq!(settings.request_timeout_secs, 30);

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, Path::new("/definitely/not/here/catalog.toml"));
        assert_eq!(settings, Settings::default());
    }
}

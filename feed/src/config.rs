use std::time::Duration;

use crate::error::{FeedError, Result};

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub api_base: String,
    pub page_limit: u64,
    /// Applied to every request; `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

impl FeedConfig {
    /// Read `KTAP_API_URL`, `KTAP_PAGE_LIMIT` and `KTAP_FETCH_TIMEOUT_MS`
    /// after loading `.env` if there is one.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base) = lookup("KTAP_API_URL").filter(|v| !v.is_empty()) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("KTAP_PAGE_LIMIT") {
            let limit: u64 = raw
                .parse()
                .map_err(|_| FeedError::Config(format!("KTAP_PAGE_LIMIT is not a number: {raw}")))?;
            if limit == 0 {
                return Err(FeedError::Config("KTAP_PAGE_LIMIT must be positive".into()));
            }
            config.page_limit = limit;
        }
        if let Some(raw) = lookup("KTAP_FETCH_TIMEOUT_MS") {
            let ms: u64 = raw.parse().map_err(|_| {
                FeedError::Config(format!("KTAP_FETCH_TIMEOUT_MS is not a number: {raw}"))
            })?;
            // 0 disables the timeout
            config.fetch_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FeedConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, FeedConfig::default());
        assert_eq!(config.url("/games"), "http://localhost:8080/games");
    }

    #[test]
    fn test_overrides() {
        let config = FeedConfig::from_vars(vars(&[
            ("KTAP_API_URL", "https://api.ktap.example/"),
            ("KTAP_PAGE_LIMIT", "50"),
            ("KTAP_FETCH_TIMEOUT_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://api.ktap.example");
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.fetch_timeout, None);
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            FeedConfig::from_vars(vars(&[("KTAP_PAGE_LIMIT", "0")])),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            FeedConfig::from_vars(vars(&[("KTAP_FETCH_TIMEOUT_MS", "soon")])),
            Err(FeedError::Config(_))
        ));
    }
}

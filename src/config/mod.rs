use std::env;
use std::time::Duration;

use crate::etherscan::client::{DEFAULT_RATE_LIMIT, ETHERSCAN_API_BASE};
use crate::services::ScanPacing;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Upstream
    pub etherscan_api_key: String,
    pub etherscan_base_url: String,
    pub rate_limit: u32,
    pub http_timeout: Duration,

    // Bearer token for /tools; unauthenticated when unset
    pub api_token: Option<String>,

    pub pacing: ScanPacing,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let etherscan_api_key = var("ETHERSCAN_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("ETHERSCAN_API_KEY must be set"))?;

        let rate_limit: u32 = match var("RATE_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("RATE_LIMIT must be a positive integer: {e}"))?,
            None => DEFAULT_RATE_LIMIT,
        };
        if rate_limit == 0 {
            anyhow::bail!("RATE_LIMIT must be greater than zero");
        }

        let parse_u64 = |key: &str, default: u64| -> anyhow::Result<u64> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{key} must be an integer: {e}")),
                None => Ok(default),
            }
        };

        // The default pauses are a floor; only longer pauses can be configured.
        let pause = |key: &str, floor: Duration| -> anyhow::Result<Duration> {
            let ms = parse_u64(key, floor.as_millis() as u64)?;
            let configured = Duration::from_millis(ms);
            if configured < floor {
                tracing::warn!(
                    key,
                    configured_ms = ms,
                    floor_ms = floor.as_millis() as u64,
                    "Discovery pause below minimum, using minimum"
                );
                return Ok(floor);
            }
            Ok(configured)
        };

        let defaults = ScanPacing::default();
        let pacing = ScanPacing {
            seed_pause: pause("DISCOVERY_SEED_PAUSE_MS", defaults.seed_pause)?,
            item_pause: pause("DISCOVERY_ITEM_PAUSE_MS", defaults.item_pause)?,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("PORT").unwrap_or_else(|| "8080".into()).trim().parse()?,
            etherscan_api_key,
            etherscan_base_url: var("ETHERSCAN_BASE_URL")
                .unwrap_or_else(|| ETHERSCAN_API_BASE.into()),
            rate_limit,
            http_timeout: Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", 30)?),
            api_token: var("API_TOKEN"),
            pacing,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ETHERSCAN_API_KEY", "abc")]).unwrap();
        assert_eq!(config.rate_limit, 5);
        assert_eq!(config.port, 8080);
        assert_eq!(config.etherscan_base_url, ETHERSCAN_API_BASE);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.pacing, ScanPacing::default());
        assert!(config.api_token.is_none());
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("ETHERSCAN_API_KEY"));
        assert!(load(&[("ETHERSCAN_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_rate_limit_must_be_positive() {
        assert!(load(&[("ETHERSCAN_API_KEY", "abc"), ("RATE_LIMIT", "0")]).is_err());
        assert!(load(&[("ETHERSCAN_API_KEY", "abc"), ("RATE_LIMIT", "fast")]).is_err());
        let config = load(&[("ETHERSCAN_API_KEY", "abc"), ("RATE_LIMIT", "2")]).unwrap();
        assert_eq!(config.rate_limit, 2);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ETHERSCAN_API_KEY", "abc"),
            ("API_TOKEN", "tok"),
            ("PORT", "9000"),
            ("DISCOVERY_SEED_PAUSE_MS", "1000"),
            ("DISCOVERY_ITEM_PAUSE_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.pacing.seed_pause, Duration::from_secs(1));
        assert_eq!(config.pacing.item_pause, Duration::from_millis(250));
    }

    #[test]
    fn test_pauses_cannot_go_below_defaults() {
        let config = load(&[
            ("ETHERSCAN_API_KEY", "abc"),
            ("DISCOVERY_SEED_PAUSE_MS", "0"),
            ("DISCOVERY_ITEM_PAUSE_MS", "5"),
        ])
        .unwrap();
        assert_eq!(config.pacing, ScanPacing::default());
        assert!(load(&[("ETHERSCAN_API_KEY", "abc"), ("DISCOVERY_ITEM_PAUSE_MS", "soon")]).is_err());
    }
}

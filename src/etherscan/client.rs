use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

pub const ETHERSCAN_API_BASE: &str = "https://api.etherscan.io/api";
pub const DEFAULT_RATE_LIMIT: u32 = 5;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Etherscan API error: {message}{}", upstream_detail(.result))]
    Upstream { message: String, result: Value },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

fn upstream_detail(result: &Value) -> String {
    match result {
        Value::String(s) if !s.is_empty() => format!(" ({s})"),
        _ => String::new(),
    }
}

impl ClientError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "transport",
            ClientError::Upstream { .. } => "upstream",
            ClientError::UnexpectedResponse(_) => "unexpected_response",
        }
    }
}

/// Etherscan-style HTTP client with a minimum interval between requests.
///
/// The interval is `1 / requests_per_second`. A request that arrives too soon
/// after the last successful round trip waits out the remainder instead of
/// being rejected. Failed requests leave the throttle clock untouched.
#[derive(Debug)]
pub struct EtherscanClient {
    http: Client,
    base_url: String,
    api_key: String,
    min_interval: Duration,
    // Held across the wait and the round trip so concurrent callers are serialised.
    last_request: Mutex<Option<Instant>>,
}

impl EtherscanClient {
    pub fn new(http: Client, api_key: impl Into<String>, requests_per_second: u32) -> Self {
        Self::with_base_url(http, ETHERSCAN_API_BASE, api_key, requests_per_second)
    }

    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        requests_per_second: u32,
    ) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            min_interval: Duration::from_secs(1) / rps,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Issue a GET with the given `module`/`action` parameters and return the
    /// full `{status, message, result}` object.
    pub async fn request(&self, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let mut last = self.last_request.lock().await;

        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        let url = self.build_url(params)?;
        let started = Instant::now();
        counter!("etherscan_requests_total").increment(1);

        let result = self.round_trip(url).await;
        histogram!("etherscan_request_seconds").record(started.elapsed().as_secs_f64());

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                counter!("etherscan_errors_total", "kind" => e.kind()).increment(1);
                tracing::debug!(error = %e, "Etherscan request failed");
                return Err(e);
            }
        };

        *last = Some(Instant::now());
        drop(last);

        if body.get("status").and_then(Value::as_str) == Some("0") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            let result = body.get("result").cloned().unwrap_or(Value::Null);
            counter!("etherscan_errors_total", "kind" => "upstream").increment(1);
            return Err(ClientError::Upstream { message, result });
        }

        Ok(body)
    }

    fn build_url(&self, params: &[(&str, String)]) -> Result<Url, ClientError> {
        let pairs = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(std::iter::once(("apikey", self.api_key.as_str())));

        Url::parse_with_params(&self.base_url, pairs)
            .map_err(|e| ClientError::UnexpectedResponse(format!("invalid base URL: {e}")))
    }

    async fn round_trip(&self, url: Url) -> Result<Value, ClientError> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        let body: Value = resp.json().await?;
        Ok(body)
    }
}

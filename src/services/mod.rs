pub mod whale_analyzer;
pub mod whale_discovery;

use std::time::Duration;

use metrics::counter;
use serde::Serialize;

pub use whale_analyzer::{analyze_whale, analyze_whale_at, compare_whales};
pub use whale_discovery::{
    discover_movements, discover_top_whales, summarize_exchange_flows, track_exchange_whales,
    FlowBias, FlowSummary,
};

/// Fixed pauses inserted between network calls in batch scans, on top of the
/// client's own throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPacing {
    /// After each seed address has been fetched.
    pub seed_pause: Duration,
    /// After each per-item lookup (balance, analysis).
    pub item_pause: Duration,
}

impl Default for ScanPacing {
    fn default() -> Self {
        Self {
            seed_pause: Duration::from_millis(300),
            item_pause: Duration::from_millis(200),
        }
    }
}

impl ScanPacing {
    /// No pauses. Configuration never produces this; tests use it.
    pub fn none() -> Self {
        Self {
            seed_pause: Duration::ZERO,
            item_pause: Duration::ZERO,
        }
    }

    pub(crate) async fn after_seed(&self) {
        pause(self.seed_pause).await;
    }

    pub(crate) async fn after_item(&self) {
        pause(self.item_pause).await;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// An address a batch scan could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub address: String,
    pub reason: String,
}

impl Skipped {
    pub fn new(address: &str, reason: impl ToString) -> Self {
        Self {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of a batch scan: what was found, and what had to be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> ScanReport<T> {
    /// Split per-address outcomes into found items and skipped addresses,
    /// logging each skip under the `scan` name.
    pub fn from_outcomes<I>(scan: &'static str, outcomes: Vec<Result<I, Skipped>>) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = Vec::new();
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                Ok(found) => items.extend(found),
                Err(skip) => {
                    tracing::warn!(
                        scan = scan,
                        address = %skip.address,
                        reason = %skip.reason,
                        "Skipping address in scan"
                    );
                    counter!("scan_items_skipped_total", "scan" => scan).increment(1);
                    skipped.push(skip);
                }
            }
        }

        Self { items, skipped }
    }

    /// Order items with `compare` and keep at most `limit`.
    pub fn rank_by<F>(mut self, limit: usize, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items.sort_by(compare);
        self.items.truncate(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

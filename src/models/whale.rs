use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::intelligence::WhaleClass;

/// Behavioural metrics for one address, recomputed on every analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhaleMetrics {
    pub address: String,
    pub eth_balance: Decimal,
    pub whale_class: WhaleClass,
    pub total_transactions: usize,
    /// Transactions above 50 ETH.
    pub large_transactions: usize,
    pub avg_transaction_value: Decimal,
    pub max_transaction_value: Decimal,
    /// Oldest transaction in the sampled page, not necessarily the first ever.
    pub first_seen: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    /// 0–100
    pub activity_score: Decimal,
    /// 0–100
    pub risk_score: Decimal,
    pub token_diversity: usize,
}

impl WhaleMetrics {
    /// Metrics for an address with no transaction history.
    pub fn inactive(address: &str, eth_balance: Decimal, whale_class: WhaleClass) -> Self {
        Self {
            address: address.to_string(),
            eth_balance,
            whale_class,
            total_transactions: 0,
            large_transactions: 0,
            avg_transaction_value: Decimal::ZERO,
            max_transaction_value: Decimal::ZERO,
            first_seen: None,
            last_activity: None,
            activity_score: Decimal::ZERO,
            risk_score: Decimal::ZERO,
            token_diversity: 0,
        }
    }
}

/// A whale found by walking counterparties of large transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredWhale {
    pub address: String,
    pub eth_balance: Decimal,
    pub whale_class: WhaleClass,
    pub label: Option<String>,
    pub exchange: Option<String>,
    pub discovery_method: String,
}

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::etherscan::{TokenTransfer, Transaction};
use crate::intelligence::registry;

/// Transactions above this value (ETH) count as large.
pub const LARGE_TX_ETH: i64 = 50;

/// How many of the most recent transactions feed the activity score.
pub const ACTIVITY_WINDOW: usize = 20;

/// Recency window, in days, for activity and new-address checks.
pub const RECENT_DAYS: i64 = 30;

const SCORE_MAX: Decimal = Decimal::ONE_HUNDRED;

/// Aggregate value statistics over a page of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionStats {
    pub total: usize,
    pub large: usize,
    pub avg_value: Decimal,
    pub max_value: Decimal,
}

pub fn transaction_stats(transactions: &[Transaction]) -> TransactionStats {
    let large_threshold = Decimal::from(LARGE_TX_ETH);
    let mut sum = Decimal::ZERO;
    let mut max = Decimal::ZERO;
    let mut large = 0usize;

    for tx in transactions {
        let value = tx.value_eth();
        sum = sum.saturating_add(value);
        max = max.max(value);
        if value > large_threshold {
            large += 1;
        }
    }

    let avg_value = if transactions.is_empty() {
        Decimal::ZERO
    } else {
        sum / Decimal::from(transactions.len() as i64)
    };

    TransactionStats {
        total: transactions.len(),
        large,
        avg_value,
        max_value: max,
    }
}

// ---------------------------------------------------------------------------
// Activity score
// ---------------------------------------------------------------------------

/// Share of the last 20 transactions that happened in the last 30 days,
/// scaled to 0–100. Expects newest-first ordering.
pub fn activity_score(transactions: &[Transaction], now: DateTime<Utc>) -> Decimal {
    if transactions.is_empty() {
        return Decimal::ZERO;
    }

    let recent = transactions
        .iter()
        .take(ACTIVITY_WINDOW)
        .filter(|tx| (now - tx.timestamp).num_days() <= RECENT_DAYS)
        .count();

    let score = Decimal::from(recent as i64) / Decimal::from(ACTIVITY_WINDOW as i64) * SCORE_MAX;
    score.min(SCORE_MAX)
}

// ---------------------------------------------------------------------------
// Risk score
// ---------------------------------------------------------------------------

/// Independent weighted risk signals. Summed, then clamped to 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskSignal {
    /// Balance above 1,000 ETH.
    HighBalance,
    /// Address is a labelled known entity.
    KnownEntity,
    /// More than half the sampled transactions exceed 100 ETH.
    LargeTransactionConcentration,
    /// Oldest sampled transaction is under 30 days old.
    NewAddress,
}

impl RiskSignal {
    pub fn weight(&self) -> i64 {
        match self {
            RiskSignal::HighBalance => 30,
            RiskSignal::KnownEntity => -20,
            RiskSignal::LargeTransactionConcentration => 25,
            RiskSignal::NewAddress => 40,
        }
    }
}

/// Evaluate which risk signals fire. `transactions` is newest-first.
pub fn risk_signals(
    address: &str,
    eth_balance: Decimal,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> Vec<RiskSignal> {
    let mut signals = Vec::new();

    if eth_balance > Decimal::from(1_000) {
        signals.push(RiskSignal::HighBalance);
    }

    if registry::is_known_entity(address) {
        signals.push(RiskSignal::KnownEntity);
    }

    if !transactions.is_empty() {
        let over_100 = transactions
            .iter()
            .filter(|tx| tx.value_eth() > Decimal::ONE_HUNDRED)
            .count();
        let ratio = Decimal::from(over_100 as i64) / Decimal::from(transactions.len() as i64);
        if ratio > Decimal::new(5, 1) {
            signals.push(RiskSignal::LargeTransactionConcentration);
        }
    }

    if let Some(oldest) = transactions.last() {
        if (now - oldest.timestamp).num_days() < RECENT_DAYS {
            signals.push(RiskSignal::NewAddress);
        }
    }

    signals
}

pub fn risk_score(
    address: &str,
    eth_balance: Decimal,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> Decimal {
    let total: i64 = risk_signals(address, eth_balance, transactions, now)
        .iter()
        .map(RiskSignal::weight)
        .sum();

    Decimal::from(total).clamp(Decimal::ZERO, SCORE_MAX)
}

// ---------------------------------------------------------------------------
// Token diversity
// ---------------------------------------------------------------------------

/// Distinct token contracts seen. An empty contract address is its own
/// bucket rather than being dropped.
pub fn token_diversity(transfers: &[TokenTransfer]) -> usize {
    transfers
        .iter()
        .map(|t| t.contract_address.to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

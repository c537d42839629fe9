use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::WhaleError;
use crate::etherscan::{ChainData, Transaction, TxQuery};
use crate::intelligence::registry::{self, EXCHANGES, KNOWN_ENTITIES};
use crate::intelligence::{classify, WhaleClass};
use crate::models::{DiscoveredWhale, ExchangeMovement, FlowDirection, WhaleMovement};

use super::{ScanPacing, ScanReport, Skipped};

// Fan-out limits per scan.
const MOVEMENT_SEEDS: usize = 10;
const MOVEMENT_TXS_PER_SEED: u32 = 20;
const MOVEMENT_LIMIT: usize = 50;

const WHALE_SEEDS: usize = 5;
const WHALE_TXS_PER_SEED: u32 = 50;
const WHALE_CANDIDATE_LIMIT: usize = 30;
const WHALE_RESULT_LIMIT: usize = 20;
/// Counterparties are collected from transactions at or above this value (ETH).
const WHALE_COUNTERPARTY_MIN_ETH: i64 = 50;

const EXCHANGE_SEEDS: usize = 5;
const EXCHANGE_TXS_PER_SEED: u32 = 30;
const EXCHANGE_LIMIT: usize = 30;

pub const DISCOVERY_METHOD: &str = "transaction_analysis";

fn require_non_negative(name: &str, value: Decimal) -> Result<(), WhaleError> {
    if value.is_sign_negative() {
        return Err(WhaleError::Validation(format!("{name} must not be negative, got {value}")));
    }
    Ok(())
}

/// Balance-based classification of counterparties, remembered for the
/// duration of one scan. A failed lookup yields `None` and never aborts the scan.
struct PartyClassifier<'a> {
    chain: &'a dyn ChainData,
    pacing: &'a ScanPacing,
    seen: HashMap<String, Option<WhaleClass>>,
}

impl<'a> PartyClassifier<'a> {
    fn new(chain: &'a dyn ChainData, pacing: &'a ScanPacing) -> Self {
        Self {
            chain,
            pacing,
            seen: HashMap::new(),
        }
    }

    async fn classify(&mut self, address: &str) -> Option<WhaleClass> {
        if address.is_empty() {
            return None;
        }
        let key = address.to_lowercase();
        if let Some(class) = self.seen.get(&key) {
            return *class;
        }

        let class = match self.chain.get_balance(address).await {
            Ok(balance) => Some(classify(balance)),
            Err(e) => {
                tracing::debug!(error = %e, address = %address, "Classification lookup failed");
                None
            }
        };
        self.pacing.after_item().await;

        self.seen.insert(key, class);
        class
    }
}

async fn fetch_seed(
    chain: &dyn ChainData,
    pacing: &ScanPacing,
    seed: &str,
    offset: u32,
) -> Result<Vec<Transaction>, Skipped> {
    let result = chain.get_transactions(seed, TxQuery::latest(offset)).await;
    pacing.after_seed().await;
    result.map_err(|e| Skipped::new(seed, e))
}

// ---------------------------------------------------------------------------
// Movements on monitored addresses
// ---------------------------------------------------------------------------

/// Large transactions on known whale and exchange wallets, with both parties
/// classified. Top 50 by value.
pub async fn discover_movements(
    chain: &dyn ChainData,
    pacing: &ScanPacing,
    min_value_eth: Decimal,
) -> Result<ScanReport<WhaleMovement>, WhaleError> {
    require_non_negative("min_value_eth", min_value_eth)?;

    let mut parties = PartyClassifier::new(chain, pacing);
    let mut outcomes = Vec::new();

    for seed in registry::monitored_addresses().into_iter().take(MOVEMENT_SEEDS) {
        let transactions = match fetch_seed(chain, pacing, seed, MOVEMENT_TXS_PER_SEED).await {
            Ok(txs) => txs,
            Err(skip) => {
                outcomes.push(Err(skip));
                continue;
            }
        };

        let mut found = Vec::new();
        for tx in transactions {
            let value_eth = tx.value_eth();
            if value_eth < min_value_eth {
                continue;
            }

            let from_class = parties.classify(&tx.from).await;
            let to_class = parties.classify(&tx.to).await;

            found.push(WhaleMovement {
                from_label: registry::label_of(&tx.from).map(String::from),
                to_label: registry::label_of(&tx.to).map(String::from),
                from_exchange: registry::exchange_of(&tx.from).map(String::from),
                to_exchange: registry::exchange_of(&tx.to).map(String::from),
                hash: tx.hash,
                from_address: tx.from,
                to_address: tx.to,
                value_eth,
                timestamp: tx.timestamp,
                block_number: tx.block_number,
                from_class,
                to_class,
            });
        }
        outcomes.push(Ok(found));
    }

    let report = ScanReport::from_outcomes("discover_movements", outcomes)
        .rank_by(MOVEMENT_LIMIT, |a, b| b.value_eth.cmp(&a.value_eth));

    tracing::info!(
        movements = report.items.len(),
        skipped = report.skipped.len(),
        min_value_eth = %min_value_eth,
        "Movement discovery complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Top whales by counterparty walk
// ---------------------------------------------------------------------------

/// Find whales among the counterparties of large transactions made by known
/// entities. Top 20 by balance.
pub async fn discover_top_whales(
    chain: &dyn ChainData,
    pacing: &ScanPacing,
    min_balance: Decimal,
) -> Result<ScanReport<DiscoveredWhale>, WhaleError> {
    require_non_negative("min_balance", min_balance)?;

    let threshold = Decimal::from(WHALE_COUNTERPARTY_MIN_ETH);
    let mut seed_failures = Vec::new();
    // Insertion-ordered, keyed on the lowercase address; first-seen casing kept.
    let mut candidates: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (seed, _) in KNOWN_ENTITIES.iter().take(WHALE_SEEDS) {
        let transactions = match fetch_seed(chain, pacing, seed, WHALE_TXS_PER_SEED).await {
            Ok(txs) => txs,
            Err(skip) => {
                seed_failures.push(skip);
                continue;
            }
        };

        for tx in transactions.iter().filter(|tx| tx.value_eth() >= threshold) {
            for party in [&tx.from, &tx.to] {
                if !party.is_empty() && seen.insert(party.to_lowercase()) {
                    candidates.push(party.clone());
                }
            }
        }
    }

    tracing::debug!(candidates = candidates.len(), "Collected whale candidates");

    let mut outcomes: Vec<Result<Option<DiscoveredWhale>, Skipped>> =
        seed_failures.into_iter().map(Err).collect();

    for address in candidates.iter().take(WHALE_CANDIDATE_LIMIT) {
        let outcome = match chain.get_balance(address).await {
            Ok(eth_balance) if eth_balance >= min_balance => Ok(Some(DiscoveredWhale {
                address: address.clone(),
                eth_balance,
                whale_class: classify(eth_balance),
                label: registry::label_of(address).map(String::from),
                exchange: registry::exchange_of(address).map(String::from),
                discovery_method: DISCOVERY_METHOD.to_string(),
            })),
            Ok(_) => Ok(None),
            Err(e) => Err(Skipped::new(address, e)),
        };
        outcomes.push(outcome);
        pacing.after_item().await;
    }

    let report = ScanReport::from_outcomes("discover_top_whales", outcomes)
        .rank_by(WHALE_RESULT_LIMIT, |a, b| b.eth_balance.cmp(&a.eth_balance));

    tracing::info!(
        whales = report.items.len(),
        skipped = report.skipped.len(),
        min_balance = %min_balance,
        "Top whale discovery complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Exchange deposits / withdrawals
// ---------------------------------------------------------------------------

/// Large deposits to and withdrawals from known exchange wallets. Top 30 by value.
pub async fn track_exchange_whales(
    chain: &dyn ChainData,
    pacing: &ScanPacing,
    min_amount: Decimal,
) -> Result<ScanReport<ExchangeMovement>, WhaleError> {
    require_non_negative("min_amount", min_amount)?;

    let mut parties = PartyClassifier::new(chain, pacing);
    let mut outcomes = Vec::new();

    for (exchange_address, exchange) in EXCHANGES.iter().take(EXCHANGE_SEEDS) {
        let transactions =
            match fetch_seed(chain, pacing, exchange_address, EXCHANGE_TXS_PER_SEED).await {
                Ok(txs) => txs,
                Err(skip) => {
                    outcomes.push(Err(skip));
                    continue;
                }
            };

        let mut found = Vec::new();
        for tx in transactions {
            let value_eth = tx.value_eth();
            if value_eth < min_amount {
                continue;
            }

            let direction = FlowDirection::relative_to(exchange_address, &tx.to);
            let whale_address = match direction {
                FlowDirection::Deposit => tx.from,
                FlowDirection::Withdrawal => tx.to,
            };
            let whale_class = parties.classify(&whale_address).await;

            found.push(ExchangeMovement {
                hash: tx.hash,
                exchange: exchange.to_string(),
                exchange_address: exchange_address.to_string(),
                whale_label: registry::label_of(&whale_address).map(String::from),
                whale_address,
                direction,
                value_eth,
                whale_class,
                timestamp: tx.timestamp,
                block_number: tx.block_number,
            });
        }
        outcomes.push(Ok(found));
    }

    let report = ScanReport::from_outcomes("track_exchange_whales", outcomes)
        .rank_by(EXCHANGE_LIMIT, |a, b| b.value_eth.cmp(&a.value_eth));

    tracing::info!(
        movements = report.items.len(),
        skipped = report.skipped.len(),
        min_amount = %min_amount,
        "Exchange whale tracking complete"
    );

    Ok(report)
}

/// Which way exchange flow leans over a set of movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowBias {
    /// More ETH withdrawn than deposited.
    NetAccumulation,
    /// More ETH deposited than withdrawn.
    NetSelling,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub deposits: usize,
    pub withdrawals: usize,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    /// Withdrawals minus deposits.
    pub net_flow: Decimal,
    pub active_exchanges: usize,
    pub bias: FlowBias,
}

pub fn summarize_exchange_flows(movements: &[ExchangeMovement]) -> FlowSummary {
    let mut summary = FlowSummary {
        deposits: 0,
        withdrawals: 0,
        total_deposits: Decimal::ZERO,
        total_withdrawals: Decimal::ZERO,
        net_flow: Decimal::ZERO,
        active_exchanges: 0,
        bias: FlowBias::Balanced,
    };
    let mut exchanges = HashSet::new();

    for m in movements {
        exchanges.insert(m.exchange.as_str());
        match m.direction {
            FlowDirection::Deposit => {
                summary.deposits += 1;
                summary.total_deposits += m.value_eth;
            }
            FlowDirection::Withdrawal => {
                summary.withdrawals += 1;
                summary.total_withdrawals += m.value_eth;
            }
        }
    }

    summary.net_flow = summary.total_withdrawals - summary.total_deposits;
    summary.active_exchanges = exchanges.len();
    summary.bias = if summary.net_flow > Decimal::ZERO {
        FlowBias::NetAccumulation
    } else if summary.net_flow < Decimal::ZERO {
        FlowBias::NetSelling
    } else {
        FlowBias::Balanced
    };

    summary
}

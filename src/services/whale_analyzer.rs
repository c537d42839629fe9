use chrono::{DateTime, Utc};

use crate::errors::WhaleError;
use crate::etherscan::{ChainData, TxQuery};
use crate::intelligence::{activity_score, classify, risk_score, token_diversity, transaction_stats};
use crate::models::WhaleMetrics;

use super::{ScanPacing, ScanReport, Skipped};

/// Transactions sampled per analysis.
const ANALYSIS_TX_LIMIT: u32 = 100;

/// Token transfers sampled for the diversity count.
const ANALYSIS_TRANSFER_LIMIT: u32 = 50;

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 10;

/// Full behavioural analysis of one address.
///
/// Any upstream failure aborts the analysis; no partial metrics are returned.
pub async fn analyze_whale(chain: &dyn ChainData, address: &str) -> Result<WhaleMetrics, WhaleError> {
    analyze_whale_at(chain, address, Utc::now()).await
}

/// Same as [`analyze_whale`] with an explicit reference time for the
/// recency-based scores.
pub async fn analyze_whale_at(
    chain: &dyn ChainData,
    address: &str,
    now: DateTime<Utc>,
) -> Result<WhaleMetrics, WhaleError> {
    let failed = WhaleError::analysis(address);

    let eth_balance = chain.get_balance(address).await.map_err(&failed)?;
    let whale_class = classify(eth_balance);

    let transactions = chain
        .get_transactions(address, TxQuery::latest(ANALYSIS_TX_LIMIT))
        .await
        .map_err(&failed)?;

    if transactions.is_empty() {
        tracing::debug!(address = %address, "No transactions; returning inactive metrics");
        return Ok(WhaleMetrics::inactive(address, eth_balance, whale_class));
    }

    let stats = transaction_stats(&transactions);

    // Newest first: the page only reaches back ANALYSIS_TX_LIMIT transactions,
    // so first_seen is the oldest in that window.
    let last_activity = transactions.first().map(|tx| tx.timestamp);
    let first_seen = transactions.last().map(|tx| tx.timestamp);

    let activity = activity_score(&transactions, now);
    let risk = risk_score(address, eth_balance, &transactions, now);

    let transfers = chain
        .get_token_transfers(address, None, 1, ANALYSIS_TRANSFER_LIMIT)
        .await
        .map_err(&failed)?;

    let metrics = WhaleMetrics {
        address: address.to_string(),
        eth_balance,
        whale_class,
        total_transactions: stats.total,
        large_transactions: stats.large,
        avg_transaction_value: stats.avg_value,
        max_transaction_value: stats.max_value,
        first_seen,
        last_activity,
        activity_score: activity,
        risk_score: risk,
        token_diversity: token_diversity(&transfers),
    };

    tracing::info!(
        address = %address,
        class = %metrics.whale_class,
        balance = %metrics.eth_balance,
        activity = %metrics.activity_score,
        risk = %metrics.risk_score,
        "Whale analysis complete"
    );

    Ok(metrics)
}

/// Analyse 2–10 addresses in sequence and rank them by balance.
///
/// Addresses whose analysis fails are reported as skipped rather than
/// aborting the comparison.
pub async fn compare_whales(
    chain: &dyn ChainData,
    pacing: &ScanPacing,
    addresses: &[String],
) -> Result<ScanReport<WhaleMetrics>, WhaleError> {
    if addresses.len() < MIN_COMPARE {
        return Err(WhaleError::Validation(format!(
            "at least {MIN_COMPARE} addresses required for comparison, got {}",
            addresses.len()
        )));
    }
    if addresses.len() > MAX_COMPARE {
        return Err(WhaleError::Validation(format!(
            "maximum {MAX_COMPARE} addresses allowed for comparison, got {}",
            addresses.len()
        )));
    }

    let mut outcomes = Vec::with_capacity(addresses.len());
    for address in addresses {
        let outcome = analyze_whale(chain, address)
            .await
            .map(Some)
            .map_err(|e| Skipped::new(address, e));
        outcomes.push(outcome);
        pacing.after_item().await;
    }

    Ok(ScanReport::from_outcomes("compare_whales", outcomes)
        .rank_by(MAX_COMPARE, |a, b| b.eth_balance.cmp(&a.eth_balance)))
}

//! Plain-text renderings of tool results for the calling agent.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::etherscan::{GasPrices, TokenTransfer, Transaction};
use crate::intelligence::{class_or_unknown, Significance, WhaleClass};
use crate::models::{DiscoveredWhale, ExchangeMovement, FlowDirection, WhaleMetrics, WhaleMovement};
use crate::services::{FlowBias, FlowSummary, ScanReport, Skipped};

fn eth(value: Decimal) -> String {
    format!("{value:.6} ETH")
}

fn date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".into())
}

fn tagged(address: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{address} ({label})"),
        None => address.to_string(),
    }
}

fn skipped_section(out: &mut String, skipped: &[Skipped]) {
    if skipped.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nSkipped {} address(es):", skipped.len());
    for s in skipped {
        let _ = writeln!(out, "- {}: {}", s.address, s.reason);
    }
}

pub fn balance(address: &str, balance: Decimal) -> String {
    format!("ETH balance for {address}: {}", eth(balance))
}

pub fn transactions(address: &str, txs: &[Transaction]) -> String {
    if txs.is_empty() {
        return format!("No transactions found for {address}");
    }
    let mut out = format!("Found {} transactions for {address}:\n\n", txs.len());
    for tx in txs {
        let _ = writeln!(out, "Hash: {}", tx.hash);
        let _ = writeln!(out, "From: {}", tx.from);
        let _ = writeln!(out, "To: {}", tx.to);
        let _ = writeln!(out, "Value: {}", eth(tx.value_eth()));
        let _ = writeln!(out, "Gas Used: {}", tx.gas_used);
        let _ = writeln!(out, "Block: {}", tx.block_number);
        let _ = writeln!(out, "Time: {}\n", date(Some(tx.timestamp)));
    }
    out
}

pub fn token_transfers(address: &str, transfers: &[TokenTransfer]) -> String {
    if transfers.is_empty() {
        return format!("No token transfers found for {address}");
    }
    let mut out = format!("Found {} token transfers for {address}:\n\n", transfers.len());
    for t in transfers {
        let amount = t
            .amount()
            .map(|a| format!("{a:.6}"))
            .unwrap_or_else(|| t.raw_value.to_string());
        let _ = writeln!(out, "Hash: {}", t.hash);
        let _ = writeln!(out, "Token: {} ({})", t.token_name, t.token_symbol);
        let _ = writeln!(out, "From: {}", t.from);
        let _ = writeln!(out, "To: {}", t.to);
        let _ = writeln!(out, "Value: {amount} {}", t.token_symbol);
        let _ = writeln!(out, "Block: {}\n", t.block_number);
    }
    out
}

pub fn contract_abi(address: &str, abi: &str) -> String {
    format!("Contract ABI for {address}:\n\n{abi}")
}

pub fn gas_prices(prices: &GasPrices) -> String {
    format!(
        "Current Gas Prices:\nSafe: {} Gwei\nStandard: {} Gwei\nFast: {} Gwei",
        prices.safe, prices.standard, prices.fast
    )
}

pub fn resolved_name(address: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Name for {address}: {name}"),
        None => format!("No name found for address: {address}"),
    }
}

pub fn whale_analysis(m: &WhaleMetrics) -> String {
    let mut out = format!("Whale analysis for {}\n\n", m.address);
    let _ = writeln!(out, "Classification: {} ({})", m.whale_class.title(), m.whale_class);
    let _ = writeln!(out, "ETH Balance: {}", eth(m.eth_balance));
    let _ = writeln!(out, "Total Transactions: {}", m.total_transactions);
    let _ = writeln!(out, "Large Transactions (>50 ETH): {}", m.large_transactions);
    let _ = writeln!(out, "Average Transaction: {}", eth(m.avg_transaction_value));
    let _ = writeln!(out, "Largest Transaction: {}", eth(m.max_transaction_value));
    let _ = writeln!(out, "First Seen: {}", date(m.first_seen));
    let _ = writeln!(out, "Last Activity: {}", date(m.last_activity));
    let _ = writeln!(out, "Activity Score: {:.1}/100", m.activity_score);
    let _ = writeln!(out, "Risk Score: {:.1}/100", m.risk_score);
    let _ = write!(out, "Token Diversity: {} tokens", m.token_diversity);
    out
}

pub fn whale_class(address: &str, balance: Decimal, class: WhaleClass) -> String {
    let mut out = format!("Whale classification for {address}\n\n");
    let _ = writeln!(out, "ETH Balance: {}", eth(balance));
    let _ = writeln!(out, "Class: {} ({class})", class.title());
    let _ = writeln!(out, "{}\n", class.description());
    let _ = writeln!(out, "Thresholds:");
    for c in WhaleClass::ALL {
        let marker = if c == class { " <" } else { "" };
        let _ = writeln!(out, "- {}: >= {} ETH{marker}", c.title(), c.lower_bound());
    }
    out
}

pub fn comparison(report: &ScanReport<WhaleMetrics>) -> String {
    let mut out = format!("Whale comparison ({} analysed)\n\n", report.items.len());
    for (rank, m) in report.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} | {} | {} | activity {:.1} | risk {:.1} | {} txs",
            rank + 1,
            m.address,
            eth(m.eth_balance),
            m.whale_class,
            m.activity_score,
            m.risk_score,
            m.total_transactions
        );
    }

    if !report.items.is_empty() {
        let total: Decimal = report.items.iter().map(|m| m.eth_balance).sum();
        let activity: Decimal = report.items.iter().map(|m| m.activity_score).sum();
        let count = Decimal::from(report.items.len());
        let _ = writeln!(out, "\nTotal ETH: {}", eth(total));
        let _ = writeln!(out, "Average Activity Score: {:.1}", activity / count);
    }

    skipped_section(&mut out, &report.skipped);
    out
}

pub fn movements(report: &ScanReport<WhaleMovement>, min_value_eth: Decimal) -> String {
    if report.items.is_empty() {
        let mut out = format!("No whale movements of at least {} found", eth(min_value_eth));
        skipped_section(&mut out, &report.skipped);
        return out;
    }

    let mut out = format!(
        "Found {} whale movements of at least {}:\n\n",
        report.items.len(),
        eth(min_value_eth)
    );
    for m in &report.items {
        let from_tag = m.from_label.as_deref().or(m.from_exchange.as_deref());
        let to_tag = m.to_label.as_deref().or(m.to_exchange.as_deref());
        let _ = writeln!(out, "[{}] {}", Significance::of(m.value_eth).label(), eth(m.value_eth));
        let _ = writeln!(out, "From: {} [{}]", tagged(&m.from_address, from_tag), class_or_unknown(m.from_class));
        let _ = writeln!(out, "To: {} [{}]", tagged(&m.to_address, to_tag), class_or_unknown(m.to_class));
        let _ = writeln!(out, "Hash: {}", m.hash);
        let _ = writeln!(out, "Block: {} at {}\n", m.block_number, date(Some(m.timestamp)));
    }
    skipped_section(&mut out, &report.skipped);
    out
}

pub fn top_whales(report: &ScanReport<DiscoveredWhale>, min_balance: Decimal) -> String {
    if report.items.is_empty() {
        let mut out = format!("No whales with at least {} found", eth(min_balance));
        skipped_section(&mut out, &report.skipped);
        return out;
    }

    let mut out = format!(
        "Discovered {} whales with at least {}:\n\n",
        report.items.len(),
        eth(min_balance)
    );
    for (rank, w) in report.items.iter().enumerate() {
        let tag = w.label.as_deref().or(w.exchange.as_deref());
        let _ = writeln!(
            out,
            "{}. {} | {} | {} | via {}",
            rank + 1,
            tagged(&w.address, tag),
            eth(w.eth_balance),
            w.whale_class.title(),
            w.discovery_method
        );
    }
    skipped_section(&mut out, &report.skipped);
    out
}

pub fn exchange_flows(
    report: &ScanReport<ExchangeMovement>,
    summary: &FlowSummary,
    min_amount: Decimal,
) -> String {
    if report.items.is_empty() {
        let mut out = format!("No exchange movements of at least {} found", eth(min_amount));
        skipped_section(&mut out, &report.skipped);
        return out;
    }

    let mut out = format!(
        "Found {} exchange movements of at least {}:\n\n",
        report.items.len(),
        eth(min_amount)
    );
    for m in &report.items {
        let arrow = match m.direction {
            FlowDirection::Deposit => "->",
            FlowDirection::Withdrawal => "<-",
        };
        let _ = writeln!(
            out,
            "{} {}: {} {arrow} {} [{}]",
            m.exchange,
            m.direction,
            eth(m.value_eth),
            tagged(&m.whale_address, m.whale_label.as_deref()),
            class_or_unknown(m.whale_class)
        );
        let _ = writeln!(out, "  Hash: {} (block {})", m.hash, m.block_number);
    }

    let _ = writeln!(out, "\nFlow analysis:");
    let _ = writeln!(out, "Deposits: {} totalling {}", summary.deposits, eth(summary.total_deposits));
    let _ = writeln!(
        out,
        "Withdrawals: {} totalling {}",
        summary.withdrawals,
        eth(summary.total_withdrawals)
    );
    let _ = writeln!(out, "Net Flow: {}", eth(summary.net_flow));
    let _ = writeln!(out, "Active Exchanges: {}", summary.active_exchanges);
    let bias = match summary.bias {
        FlowBias::NetAccumulation => "Net accumulation (more withdrawn than deposited)",
        FlowBias::NetSelling => "Net selling pressure (more deposited than withdrawn)",
        FlowBias::Balanced => "Balanced",
    };
    let _ = writeln!(out, "Market Signal: {bias}");

    skipped_section(&mut out, &report.skipped);
    out
}

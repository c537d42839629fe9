use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::intelligence::WhaleClass;

use super::FlowDirection;

/// A large transaction seen on a monitored address, with both parties annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhaleMovement {
    pub hash: String,
    pub from_address: String,
    pub to_address: String,
    pub value_eth: Decimal,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
    /// `None` when the balance lookup for that side failed.
    pub from_class: Option<WhaleClass>,
    pub to_class: Option<WhaleClass>,
    pub from_label: Option<String>,
    pub to_label: Option<String>,
    pub from_exchange: Option<String>,
    pub to_exchange: Option<String>,
}

/// A large transfer into or out of a known exchange wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMovement {
    pub hash: String,
    pub exchange: String,
    pub exchange_address: String,
    /// The non-exchange side of the transfer.
    pub whale_address: String,
    pub direction: FlowDirection,
    pub value_eth: Decimal,
    pub whale_class: Option<WhaleClass>,
    pub whale_label: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
}

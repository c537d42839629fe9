use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::ClientError;

/// Decimal places of the native unit (wei → ETH).
pub const ETH_DECIMALS: u32 = 18;

/// Fractional digits kept when a balance is reported.
pub const DISPLAY_DECIMALS: u32 = 6;

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

/// Convert a raw integer amount into a decimal with `decimals` places.
/// Returns `None` when the amount does not fit a 96-bit mantissa or the
/// scale is beyond what `Decimal` can represent.
pub fn scale_amount(raw: u128, decimals: u32) -> Option<Decimal> {
    let raw = i128::try_from(raw).ok()?;
    if decimals <= 28 {
        return Decimal::try_from_i128_with_scale(raw, decimals).ok();
    }
    // Scale down first so the remaining shift fits.
    let shift = decimals - 28;
    let truncated = raw / 10i128.checked_pow(shift)?;
    Decimal::try_from_i128_with_scale(truncated, 28).ok()
}

/// Wei → ETH, full precision.
pub fn wei_to_eth(wei: u128) -> Option<Decimal> {
    scale_amount(wei, ETH_DECIMALS)
}

/// ETH → wei, truncating anything below one wei.
pub fn eth_to_wei(eth: Decimal) -> Option<u128> {
    let mut scaled = eth.trunc_with_scale(ETH_DECIMALS);
    scaled.rescale(ETH_DECIMALS);
    u128::try_from(scaled.mantissa()).ok()
}

fn parse_u128(field: &str, raw: &str) -> Result<u128, ClientError> {
    raw.trim()
        .parse::<u128>()
        .map_err(|_| ClientError::UnexpectedResponse(format!("{field} is not an integer: {raw:?}")))
}

fn parse_u256(field: &str, raw: &str) -> Result<U256, ClientError> {
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|_| ClientError::UnexpectedResponse(format!("{field} is not an integer: {raw:?}")))
}

fn parse_u64(field: &str, raw: &str) -> Result<u64, ClientError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ClientError::UnexpectedResponse(format!("{field} is not an integer: {raw:?}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ClientError> {
    let secs = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ClientError::UnexpectedResponse(format!("timeStamp is not an integer: {raw:?}")))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ClientError::UnexpectedResponse(format!("timeStamp out of range: {secs}")))
}

// ---------------------------------------------------------------------------
// Normal transaction (account/txlist)
// ---------------------------------------------------------------------------

/// Wire shape of a `txlist` entry. Etherscan encodes every number as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub gas_used: String,
    pub block_number: String,
    pub time_stamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// Empty for contract creations.
    pub to: String,
    pub value_wei: u128,
    pub gas_used: u64,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Value in ETH. Saturates to `Decimal::MAX` for amounts beyond 96 bits,
    /// which no real ETH transfer reaches.
    pub fn value_eth(&self) -> Decimal {
        wei_to_eth(self.value_wei).unwrap_or(Decimal::MAX)
    }
}

impl TryFrom<ApiTransaction> for Transaction {
    type Error = ClientError;

    fn try_from(tx: ApiTransaction) -> Result<Self, Self::Error> {
        let gas_used = if tx.gas_used.is_empty() {
            0
        } else {
            parse_u64("gasUsed", &tx.gas_used)?
        };

        Ok(Self {
            value_wei: parse_u128("value", &tx.value)?,
            gas_used,
            block_number: parse_u64("blockNumber", &tx.block_number)?,
            timestamp: parse_timestamp(&tx.time_stamp)?,
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
        })
    }
}

// ---------------------------------------------------------------------------
// ERC-20 transfer (account/tokentx)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenTransfer {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub contract_address: String,
    pub value: String,
    #[serde(default)]
    pub token_decimal: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default)]
    pub token_name: String,
    pub block_number: String,
    #[serde(default)]
    pub time_stamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Token identity. May be empty when the upstream omits it.
    pub contract_address: String,
    /// Full uint256 amount; spam tokens routinely exceed 128 bits.
    pub raw_value: U256,
    pub token_decimals: u32,
    pub token_symbol: String,
    pub token_name: String,
    pub block_number: u64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TokenTransfer {
    /// Human-scale amount using this record's own decimal count. `None` when
    /// the raw value does not fit a `Decimal`.
    pub fn amount(&self) -> Option<Decimal> {
        let raw = u128::try_from(self.raw_value).ok()?;
        scale_amount(raw, self.token_decimals)
    }
}

impl TryFrom<ApiTokenTransfer> for TokenTransfer {
    type Error = ClientError;

    fn try_from(t: ApiTokenTransfer) -> Result<Self, Self::Error> {
        let token_decimals = if t.token_decimal.is_empty() {
            0
        } else {
            t.token_decimal.trim().parse::<u32>().map_err(|_| {
                ClientError::UnexpectedResponse(format!(
                    "tokenDecimal is not an integer: {:?}",
                    t.token_decimal
                ))
            })?
        };
        let timestamp = if t.time_stamp.is_empty() {
            None
        } else {
            Some(parse_timestamp(&t.time_stamp)?)
        };

        Ok(Self {
            raw_value: parse_u256("value", &t.value)?,
            token_decimals,
            block_number: parse_u64("blockNumber", &t.block_number)?,
            timestamp,
            hash: t.hash,
            from: t.from,
            to: t.to,
            contract_address: t.contract_address,
            token_symbol: t.token_symbol,
            token_name: t.token_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Gas oracle (gastracker/gasoracle)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGasOracle {
    #[serde(rename = "SafeGasPrice")]
    pub safe_gas_price: String,
    #[serde(rename = "ProposeGasPrice")]
    pub propose_gas_price: String,
    #[serde(rename = "FastGasPrice")]
    pub fast_gas_price: String,
}

/// Gwei-denominated gas prices, passed through as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasPrices {
    pub safe: String,
    pub standard: String,
    pub fast: String,
}

impl From<ApiGasOracle> for GasPrices {
    fn from(o: ApiGasOracle) -> Self {
        Self {
            safe: o.safe_gas_price,
            standard: o.propose_gas_price,
            fast: o.fast_gas_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

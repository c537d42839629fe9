use std::str::FromStr;

use alloy::primitives::Address;
use axum::extract::{Path, State};
use axum::Json;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::reports;
use crate::errors::{AppError, WhaleError};
use crate::etherscan::{ChainData, ClientError, SortOrder, TxQuery};
use crate::intelligence::classify;
use crate::services;
use crate::AppState;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CheckBalance,
    GetTransactions,
    GetTokenTransfers,
    GetContractAbi,
    GetGasPrices,
    ResolveName,
    AnalyzeWhale,
    DetectWhaleClass,
    CompareWhales,
    DiscoverWhaleMovements,
    DiscoverTopWhales,
    TrackExchangeWhales,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Param {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub description: &'static str,
}

const fn required(name: &'static str, kind: &'static str, description: &'static str) -> Param {
    Param {
        name,
        kind,
        required: true,
        default: None,
        description,
    }
}

const fn optional(
    name: &'static str,
    kind: &'static str,
    default: &'static str,
    description: &'static str,
) -> Param {
    Param {
        name,
        kind,
        required: false,
        default: Some(default),
        description,
    }
}

const ADDRESS: Param = required("address", "string", "Ethereum address (0x-prefixed, 40 hex digits)");

const ADDRESS_PARAMS: &[Param] = &[ADDRESS];

const TRANSACTION_PARAMS: &[Param] = &[
    ADDRESS,
    optional("start_block", "integer", "0", "First block to include"),
    optional("end_block", "integer", "99999999", "Last block to include"),
    optional("page", "integer", "1", "Page number"),
    optional("offset", "integer", "10", "Transactions per page"),
    optional("sort", "string", "desc", "asc or desc by block"),
];

const TOKEN_TRANSFER_PARAMS: &[Param] = &[
    ADDRESS,
    optional("contract_address", "string", "", "Only transfers of this token"),
    optional("page", "integer", "1", "Page number"),
    optional("offset", "integer", "10", "Transfers per page"),
];

const COMPARE_PARAMS: &[Param] = &[required("addresses", "string", "Comma-separated addresses, 2 to 10")];
const MOVEMENT_PARAMS: &[Param] =
    &[optional("min_eth_value", "number", "100", "Minimum transaction value in ETH")];
const TOP_WHALE_PARAMS: &[Param] = &[optional("min_balance", "number", "1000", "Minimum ETH balance")];
const EXCHANGE_PARAMS: &[Param] =
    &[optional("min_amount", "number", "500", "Minimum transfer value in ETH")];

const DEFAULT_MIN_ETH_VALUE: i64 = 100;
const DEFAULT_MIN_BALANCE: i64 = 1_000;
const DEFAULT_MIN_AMOUNT: i64 = 500;

impl Tool {
    pub const ALL: [Tool; 12] = [
        Tool::CheckBalance,
        Tool::GetTransactions,
        Tool::GetTokenTransfers,
        Tool::GetContractAbi,
        Tool::GetGasPrices,
        Tool::ResolveName,
        Tool::AnalyzeWhale,
        Tool::DetectWhaleClass,
        Tool::CompareWhales,
        Tool::DiscoverWhaleMovements,
        Tool::DiscoverTopWhales,
        Tool::TrackExchangeWhales,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::CheckBalance => "check_balance",
            Tool::GetTransactions => "get_transactions",
            Tool::GetTokenTransfers => "get_token_transfers",
            Tool::GetContractAbi => "get_contract_abi",
            Tool::GetGasPrices => "get_gas_prices",
            Tool::ResolveName => "resolve_name",
            Tool::AnalyzeWhale => "analyze_whale",
            Tool::DetectWhaleClass => "detect_whale_class",
            Tool::CompareWhales => "compare_whales",
            Tool::DiscoverWhaleMovements => "discover_whale_movements",
            Tool::DiscoverTopWhales => "discover_top_whales",
            Tool::TrackExchangeWhales => "track_exchange_whales",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::CheckBalance => "Check the ETH balance of an address",
            Tool::GetTransactions => "List recent normal transactions for an address",
            Tool::GetTokenTransfers => "List ERC-20 token transfers for an address",
            Tool::GetContractAbi => "Fetch the ABI of a verified contract",
            Tool::GetGasPrices => "Current safe, standard and fast gas prices",
            Tool::ResolveName => "Resolve an address to a name (not supported by the data source)",
            Tool::AnalyzeWhale => "Full behavioural analysis of an address",
            Tool::DetectWhaleClass => "Classify an address by ETH balance",
            Tool::CompareWhales => "Analyse and rank 2 to 10 addresses by balance",
            Tool::DiscoverWhaleMovements => "Large transactions on monitored whale and exchange wallets",
            Tool::DiscoverTopWhales => "Find whales among counterparties of known entities",
            Tool::TrackExchangeWhales => "Large deposits to and withdrawals from exchanges",
        }
    }

    pub fn parameters(&self) -> &'static [Param] {
        match self {
            Tool::CheckBalance
            | Tool::GetContractAbi
            | Tool::ResolveName
            | Tool::AnalyzeWhale
            | Tool::DetectWhaleClass => ADDRESS_PARAMS,
            Tool::GetTransactions => TRANSACTION_PARAMS,
            Tool::GetTokenTransfers => TOKEN_TRANSFER_PARAMS,
            Tool::GetGasPrices => &[],
            Tool::CompareWhales => COMPARE_PARAMS,
            Tool::DiscoverWhaleMovements => MOVEMENT_PARAMS,
            Tool::DiscoverTopWhales => TOP_WHALE_PARAMS,
            Tool::TrackExchangeWhales => EXCHANGE_PARAMS,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [Param],
}

pub async fn list() -> Json<Vec<ToolSpec>> {
    Json(
        Tool::ALL
            .iter()
            .map(|t| ToolSpec {
                name: t.name(),
                description: t.description(),
                parameters: t.parameters(),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Chain(#[from] ClientError),

    #[error(transparent)]
    Whale(#[from] WhaleError),
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    pub tool: String,
    pub report: Option<String>,
    pub error: Option<String>,
}

pub async fn call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<ToolResponse>, AppError> {
    let tool = Tool::from_name(&name).ok_or_else(|| AppError::NotFound(format!("Unknown tool: {name}")))?;
    counter!("tool_calls_total", "tool" => tool.name()).increment(1);

    let empty = Map::new();
    let args = match body.as_ref().map(|Json(v)| v) {
        None | Some(Value::Null) => Args(&empty),
        Some(Value::Object(map)) => Args(map),
        Some(_) => return Err(AppError::BadRequest("arguments must be a JSON object".into())),
    };

    let outcome = run(tool, &state, args).await;

    let response = match outcome {
        Ok(report) => {
            tracing::info!(tool = tool.name(), "Tool call succeeded");
            ToolResponse {
                success: true,
                tool: tool.name().to_string(),
                report: Some(report),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(tool = tool.name(), error = %e, "Tool call failed");
            ToolResponse {
                success: false,
                tool: tool.name().to_string(),
                report: None,
                error: Some(format!("Error running {}: {e}", tool.name())),
            }
        }
    };

    Ok(Json(response))
}

async fn run(tool: Tool, state: &AppState, args: Args<'_>) -> Result<String, ToolError> {
    let chain: &dyn ChainData = state.chain.as_ref();

    match tool {
        Tool::CheckBalance => {
            let address = args.address("address")?;
            let balance = chain.get_balance(&address).await?;
            Ok(reports::balance(&address, balance))
        }
        Tool::GetTransactions => {
            let address = args.address("address")?;
            let defaults = TxQuery::default();
            let query = TxQuery {
                start_block: args.uint("start_block", defaults.start_block)?,
                end_block: args.uint("end_block", defaults.end_block)?,
                page: args.uint("page", defaults.page)?,
                offset: args.uint("offset", defaults.offset)?,
                sort: args.sort("sort", defaults.sort)?,
            };
            let txs = chain.get_transactions(&address, query).await?;
            Ok(reports::transactions(&address, &txs))
        }
        Tool::GetTokenTransfers => {
            let address = args.address("address")?;
            let contract = args.opt_address("contract_address")?;
            let page = args.uint("page", 1u32)?;
            let offset = args.uint("offset", 10u32)?;
            let transfers = chain
                .get_token_transfers(&address, contract.as_deref(), page, offset)
                .await?;
            Ok(reports::token_transfers(&address, &transfers))
        }
        Tool::GetContractAbi => {
            let address = args.address("address")?;
            let abi = chain.get_contract_abi(&address).await?;
            Ok(reports::contract_abi(&address, &abi))
        }
        Tool::GetGasPrices => {
            let prices = chain.get_gas_prices().await?;
            Ok(reports::gas_prices(&prices))
        }
        Tool::ResolveName => {
            let address = args.address("address")?;
            let name = chain.resolve_name(&address).await?;
            Ok(reports::resolved_name(&address, name.as_deref()))
        }
        Tool::AnalyzeWhale => {
            let address = args.address("address")?;
            let metrics = services::analyze_whale(chain, &address).await?;
            Ok(reports::whale_analysis(&metrics))
        }
        Tool::DetectWhaleClass => {
            let address = args.address("address")?;
            let balance = chain.get_balance(&address).await?;
            Ok(reports::whale_class(&address, balance, classify(balance)))
        }
        Tool::CompareWhales => {
            let addresses = args.address_list("addresses")?;
            let report = services::compare_whales(chain, &state.pacing, &addresses).await?;
            Ok(reports::comparison(&report))
        }
        Tool::DiscoverWhaleMovements => {
            let min = args.decimal("min_eth_value", Decimal::from(DEFAULT_MIN_ETH_VALUE))?;
            let report = services::discover_movements(chain, &state.pacing, min).await?;
            Ok(reports::movements(&report, min))
        }
        Tool::DiscoverTopWhales => {
            let min = args.decimal("min_balance", Decimal::from(DEFAULT_MIN_BALANCE))?;
            let report = services::discover_top_whales(chain, &state.pacing, min).await?;
            Ok(reports::top_whales(&report, min))
        }
        Tool::TrackExchangeWhales => {
            let min = args.decimal("min_amount", Decimal::from(DEFAULT_MIN_AMOUNT))?;
            let report = services::track_exchange_whales(chain, &state.pacing, min).await?;
            let summary = services::summarize_exchange_flows(&report.items);
            Ok(reports::exchange_flows(&report, &summary, min))
        }
    }
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// Accept a `0x`-prefixed 20-byte hex address; checksum casing is not enforced.
/// Returns the trimmed input unchanged.
pub fn validate_address(raw: &str) -> Result<String, ToolError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") || Address::from_str(trimmed).is_err() {
        return Err(ToolError::InvalidArgs(format!(
            "invalid Ethereum address '{trimmed}': expected 0x followed by 40 hex digits"
        )));
    }
    Ok(trimmed.to_string())
}

struct Args<'a>(&'a Map<String, Value>);

impl Args<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    fn string(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ToolError::InvalidArgs(format!("{key} must be a string"))),
        }
    }

    fn address(&self, key: &str) -> Result<String, ToolError> {
        self.opt_address(key)?
            .ok_or_else(|| ToolError::InvalidArgs(format!("{key} is required")))
    }

    fn opt_address(&self, key: &str) -> Result<Option<String>, ToolError> {
        self.string(key)?.map(validate_address).transpose()
    }

    /// Comma-separated string or JSON array of addresses.
    fn address_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let raw: Vec<&str> = match self.get(key) {
            Some(Value::String(s)) => s.split(',').collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .ok_or_else(|| ToolError::InvalidArgs(format!("{key} must contain strings")))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(ToolError::InvalidArgs(format!("{key} must be a string"))),
            None => return Err(ToolError::InvalidArgs(format!("{key} is required"))),
        };

        raw.into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(validate_address)
            .collect()
    }

    fn decimal(&self, key: &str, default: Decimal) -> Result<Decimal, ToolError> {
        let text = match self.get(key) {
            None => return Ok(default),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(ToolError::InvalidArgs(format!("{key} must be a number"))),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| ToolError::InvalidArgs(format!("{key} must be a number, got '{text}'")))
    }

    fn uint<T: TryFrom<u64>>(&self, key: &str, default: T) -> Result<T, ToolError> {
        let raw = match self.get(key) {
            None => return Ok(default),
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        }
        .ok_or_else(|| ToolError::InvalidArgs(format!("{key} must be a non-negative integer")))?;

        T::try_from(raw).map_err(|_| ToolError::InvalidArgs(format!("{key} is out of range")))
    }

    fn sort(&self, key: &str, default: SortOrder) -> Result<SortOrder, ToolError> {
        match self.string(key)?.map(|s| s.to_ascii_lowercase()).as_deref() {
            None => Ok(default),
            Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(other) => Err(ToolError::InvalidArgs(format!(
                "{key} must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("mint_eth"), None);
    }

    #[test]
    fn test_validate_address() {
        let lower = "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae";
        assert_eq!(validate_address(lower).unwrap(), lower);
        // Wrong checksum casing is still accepted.
        assert!(validate_address("0xDE0B295669a9fd93d5f28d9ec85e40f4cb697bae").is_ok());
        assert!(validate_address("de0b295669a9fd93d5f28d9ec85e40f4cb697bae").is_err());
        assert!(validate_address("0x1234").is_err());
        assert!(validate_address("0xzz0b295669a9fd93d5f28d9ec85e40f4cb697bae").is_err());
    }

    #[test]
    fn test_address_list_from_comma_string() {
        let map = args(json!({
            "addresses": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae, 0x28c6c06298d514db089934071355e5743bf21d60,"
        }));
        let list = Args(&map).address_list("addresses").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], "0x28c6c06298d514db089934071355e5743bf21d60");
    }

    #[test]
    fn test_decimal_and_uint_parsing() {
        let map = args(json!({ "min": "12.5", "n": 5, "neg": -3, "big": 5_000_000_000u64 }));
        let a = Args(&map);
        assert_eq!(a.decimal("min", Decimal::ZERO).unwrap(), Decimal::new(125, 1));
        assert_eq!(a.decimal("missing", Decimal::from(100)).unwrap(), Decimal::from(100));
        assert_eq!(a.uint("n", 1u32).unwrap(), 5);
        assert!(a.uint("neg", 1u32).is_err());
        assert!(a.uint("big", 1u32).is_err());
        assert_eq!(a.uint("big", 1u64).unwrap(), 5_000_000_000);
    }

    #[test]
    fn test_sort_parsing() {
        let map = args(json!({ "sort": "ASC", "bad": "sideways" }));
        let a = Args(&map);
        assert_eq!(a.sort("sort", SortOrder::Desc).unwrap(), SortOrder::Asc);
        assert_eq!(a.sort("missing", SortOrder::Desc).unwrap(), SortOrder::Desc);
        assert!(a.sort("bad", SortOrder::Desc).is_err());
    }
}

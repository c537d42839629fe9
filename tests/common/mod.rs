use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use whalescan::api::router::create_router;
use whalescan::etherscan::EtherscanClient;
use whalescan::services::ScanPacing;
use whalescan::AppState;

pub const TEST_API_KEY: &str = "test-key";

pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

pub fn eth(amount: u128) -> u128 {
    amount * WEI_PER_ETH
}

/// A request the fake upstream received.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub at: Instant,
    pub params: HashMap<String, String>,
}

#[derive(Default)]
struct FakeData {
    balances: HashMap<String, String>,
    transactions: HashMap<String, Vec<Value>>,
    token_transfers: HashMap<String, Vec<Value>>,
    abis: HashMap<String, String>,
    upstream_errors: HashMap<String, (String, Value)>,
    http_errors: HashSet<String>,
    requests: Vec<Recorded>,
}

/// In-process stand-in for the Etherscan API, keyed on lowercase address.
#[derive(Clone, Default)]
pub struct FakeEtherscan {
    data: Arc<Mutex<FakeData>>,
}

#[allow(dead_code)]
impl FakeEtherscan {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(self, f: impl FnOnce(&mut FakeData)) -> Self {
        f(&mut self.data.lock().unwrap());
        self
    }

    pub fn balance(self, address: &str, wei: u128) -> Self {
        self.with(|d| {
            d.balances.insert(address.to_lowercase(), wei.to_string());
        })
    }

    /// Newest first, as the upstream returns them for `sort=desc`.
    pub fn transactions(self, address: &str, txs: Vec<Value>) -> Self {
        self.with(|d| {
            d.transactions.insert(address.to_lowercase(), txs);
        })
    }

    pub fn token_transfers(self, address: &str, transfers: Vec<Value>) -> Self {
        self.with(|d| {
            d.token_transfers.insert(address.to_lowercase(), transfers);
        })
    }

    pub fn abi(self, address: &str, abi: &str) -> Self {
        self.with(|d| {
            d.abis.insert(address.to_lowercase(), abi.to_string());
        })
    }

    /// Every call for `address` answers `status: "0"`.
    pub fn upstream_error(self, address: &str, message: &str, result: Value) -> Self {
        self.with(|d| {
            d.upstream_errors
                .insert(address.to_lowercase(), (message.to_string(), result));
        })
    }

    /// Every call for `address` answers HTTP 500.
    pub fn http_error(self, address: &str) -> Self {
        self.with(|d| {
            d.http_errors.insert(address.to_lowercase());
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.data.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, action: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.params.get("action").map(String::as_str) == Some(action))
            .count()
    }

    /// Serve on an ephemeral port and return the API base URL.
    pub async fn start(&self) -> String {
        let app = Router::new().route("/api", get(handle)).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }
}

fn ok(result: Value) -> Response {
    Json(json!({ "status": "1", "message": "OK", "result": result })).into_response()
}

fn notok(message: &str, result: Value) -> Response {
    Json(json!({ "status": "0", "message": message, "result": result })).into_response()
}

fn page(records: Option<&Vec<Value>>, params: &HashMap<String, String>) -> Response {
    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(10);
    match records {
        Some(list) if !list.is_empty() => {
            ok(Value::Array(list.iter().take(offset).cloned().collect()))
        }
        _ => notok("No transactions found", json!([])),
    }
}

async fn handle(
    State(fake): State<FakeEtherscan>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut data = fake.data.lock().unwrap();
    data.requests.push(Recorded {
        at: Instant::now(),
        params: params.clone(),
    });

    if params.get("apikey").map(String::as_str) != Some(TEST_API_KEY) {
        return notok("NOTOK", json!("Invalid API Key"));
    }

    let address = params
        .get("address")
        .map(|a| a.to_lowercase())
        .unwrap_or_default();

    if data.http_errors.contains(&address) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if let Some((message, result)) = data.upstream_errors.get(&address) {
        return notok(message, result.clone());
    }

    let module = params.get("module").map(String::as_str).unwrap_or_default();
    let action = params.get("action").map(String::as_str).unwrap_or_default();

    match (module, action) {
        ("account", "balance") => {
            let wei = data.balances.get(&address).cloned().unwrap_or_else(|| "0".into());
            ok(json!(wei))
        }
        ("account", "txlist") => page(data.transactions.get(&address), &params),
        ("account", "tokentx") => {
            let filtered = data.token_transfers.get(&address).map(|list| {
                match params.get("contractaddress") {
                    Some(contract) => list
                        .iter()
                        .filter(|t| t["contractAddress"].as_str() == Some(contract.as_str()))
                        .cloned()
                        .collect(),
                    None => list.clone(),
                }
            });
            page(filtered.as_ref(), &params)
        }
        ("contract", "getabi") => match data.abis.get(&address) {
            Some(abi) => ok(json!(abi)),
            None => notok("NOTOK", json!("Contract source code not verified")),
        },
        ("gastracker", "gasoracle") => ok(json!({
            "LastBlock": "19000000",
            "SafeGasPrice": "20",
            "ProposeGasPrice": "25",
            "FastGasPrice": "30",
        })),
        _ => notok("NOTOK", json!("Error! Missing Or invalid Module name")),
    }
}

/// A `txlist` record `days_ago` days old.
#[allow(dead_code)]
pub fn tx(hash: &str, from: &str, to: &str, wei: u128, days_ago: i64) -> Value {
    let ts = (Utc::now() - Duration::days(days_ago)).timestamp();
    json!({
        "hash": hash,
        "from": from,
        "to": to,
        "value": wei.to_string(),
        "gasUsed": "21000",
        "blockNumber": (19_000_000 - days_ago * 7_000).to_string(),
        "timeStamp": ts.to_string(),
    })
}

/// A `tokentx` record.
#[allow(dead_code)]
pub fn transfer(contract: &str, symbol: &str, raw: u128, decimals: u32) -> Value {
    json!({
        "hash": "0xtoken",
        "from": "0x1111111111111111111111111111111111111111",
        "to": "0x2222222222222222222222222222222222222222",
        "contractAddress": contract,
        "value": raw.to_string(),
        "tokenDecimal": decimals.to_string(),
        "tokenSymbol": symbol,
        "tokenName": format!("{symbol} Token"),
        "blockNumber": "19000000",
        "timeStamp": Utc::now().timestamp().to_string(),
    })
}

/// Client against the fake with a high rate so throttling does not slow tests.
#[allow(dead_code)]
pub fn test_client(base_url: &str, requests_per_second: u32) -> EtherscanClient {
    EtherscanClient::with_base_url(reqwest::Client::new(), base_url, TEST_API_KEY, requests_per_second)
}

#[allow(dead_code)]
pub async fn build_test_app(fake: &FakeEtherscan, api_token: Option<&str>) -> Router {
    let base_url = fake.start().await;
    let state = AppState {
        chain: Arc::new(test_client(&base_url, 1_000)),
        pacing: ScanPacing::none(),
        metrics_handle: whalescan::metrics::detached_handle(),
        api_token: api_token.map(String::from),
    };
    create_router(state)
}

mod common;

use std::time::Duration;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde_json::json;

use common::{eth, test_client, transfer, tx, FakeEtherscan};
use whalescan::etherscan::{ChainData, ClientError, EtherscanClient, SortOrder, TxQuery};
use whalescan::services::analyze_whale;

const WHALE: &str = "0x1234567890abcdef1234567890abcdef12345678";
const OTHER: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

#[tokio::test]
async fn test_balance_is_rounded_eth() {
    // 1.2345678 ETH in wei
    let fake = FakeEtherscan::new().balance(WHALE, 1_234_567_800_000_000_000);
    let client = test_client(&fake.start().await, 100);

    let balance = client.get_balance(WHALE).await.unwrap();
    assert_eq!(balance, Decimal::new(1_234_568, 6));
}

#[tokio::test]
async fn test_requests_are_spaced_by_min_interval() {
    let fake = FakeEtherscan::new().balance(WHALE, eth(1));
    let client = test_client(&fake.start().await, 5);

    for _ in 0..3 {
        client.get_balance(WHALE).await.unwrap();
    }

    let requests = fake.requests();
    assert_eq!(requests.len(), 3);
    for pair in requests.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        // 200ms interval; allow for timer granularity on the receiving side.
        assert!(gap >= Duration::from_millis(180), "gap was {gap:?}");
    }
}

#[tokio::test]
async fn test_concurrent_callers_are_serialised() {
    let fake = FakeEtherscan::new().balance(WHALE, eth(1));
    let client = std::sync::Arc::new(test_client(&fake.start().await, 10));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_balance(WHALE).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let mut times: Vec<_> = fake.requests().iter().map(|r| r.at).collect();
    times.sort();
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(80));
    }
}

#[tokio::test]
async fn test_upstream_status_zero_is_upstream_error() {
    let fake = FakeEtherscan::new().upstream_error(WHALE, "NOTOK", json!("Max rate limit reached"));
    let client = test_client(&fake.start().await, 100);

    let err = client.get_balance(WHALE).await.unwrap_err();
    match &err {
        ClientError::Upstream { message, result } => {
            assert_eq!(message, "NOTOK");
            assert_eq!(result, &json!("Max rate limit reached"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert!(err.to_string().contains("Max rate limit reached"));
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let fake = FakeEtherscan::new().http_error(WHALE);
    let client = test_client(&fake.start().await, 100);

    let err = client.get_balance(WHALE).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_failed_request_does_not_advance_throttle() {
    // Nothing listens on port 9 here; the connect fails immediately.
    let client = EtherscanClient::with_base_url(reqwest::Client::new(), "http://127.0.0.1:9/api", "k", 1);

    assert!(client.get_balance(WHALE).await.is_err());
    let started = std::time::Instant::now();
    assert!(client.get_balance(WHALE).await.is_err());
    // A 1 rps throttle would have held the second call for about a second.
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_no_transactions_found_is_empty_list() {
    let fake = FakeEtherscan::new();
    let client = test_client(&fake.start().await, 100);

    let txs = client.get_transactions(WHALE, TxQuery::default()).await.unwrap();
    assert!(txs.is_empty());
    let transfers = client.get_token_transfers(WHALE, None, 1, 10).await.unwrap();
    assert!(transfers.is_empty());
}

#[tokio::test]
async fn test_uint256_token_value_does_not_break_analysis() {
    let mut spam = transfer("0x5pam000000000000000000000000000000000000", "SPAM", 0, 18);
    spam["value"] = json!(U256::MAX.to_string());
    let fake = FakeEtherscan::new()
        .balance(WHALE, eth(2_000))
        .transactions(WHALE, vec![tx("0x1", WHALE, OTHER, eth(150), 1)])
        .token_transfers(
            WHALE,
            vec![
                spam,
                transfer("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT", 2_500_000, 6),
            ],
        );
    let client = test_client(&fake.start().await, 100);

    let transfers = client.get_token_transfers(WHALE, None, 1, 50).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].raw_value, U256::MAX);
    assert_eq!(transfers[0].amount(), None);
    assert_eq!(transfers[1].amount(), Some(Decimal::new(25, 1)));

    let metrics = analyze_whale(&client, WHALE).await.unwrap();
    assert_eq!(metrics.total_transactions, 1);
    assert_eq!(metrics.token_diversity, 2);
}

#[tokio::test]
async fn test_transactions_are_parsed_and_paged() {
    let fake = FakeEtherscan::new().transactions(
        WHALE,
        vec![
            tx("0xa", WHALE, OTHER, eth(60), 1),
            tx("0xb", OTHER, WHALE, eth(2), 3),
            tx("0xc", WHALE, OTHER, eth(1), 5),
        ],
    );
    let client = test_client(&fake.start().await, 100);

    let query = TxQuery {
        offset: 2,
        sort: SortOrder::Desc,
        ..TxQuery::default()
    };
    let txs = client.get_transactions(WHALE, query).await.unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].hash, "0xa");
    assert_eq!(txs[0].value_eth(), Decimal::from(60));
    assert_eq!(txs[0].gas_used, 21_000);

    let sent = &fake.requests()[0].params;
    assert_eq!(sent["startblock"], "0");
    assert_eq!(sent["endblock"], "99999999");
    assert_eq!(sent["offset"], "2");
    assert_eq!(sent["sort"], "desc");
}

#[tokio::test]
async fn test_unverified_contract_abi_fails() {
    let verified = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
    let fake = FakeEtherscan::new().abi(verified, "[{\"type\":\"function\"}]");
    let client = test_client(&fake.start().await, 100);

    assert_eq!(client.get_contract_abi(verified).await.unwrap(), "[{\"type\":\"function\"}]");
    let err = client.get_contract_abi(WHALE).await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream { .. }));
}

#[tokio::test]
async fn test_gas_prices_and_name_resolution() {
    let fake = FakeEtherscan::new();
    let client = test_client(&fake.start().await, 100);

    let gas = client.get_gas_prices().await.unwrap();
    assert_eq!(gas.safe, "20");
    assert_eq!(gas.standard, "25");
    assert_eq!(gas.fast, "30");

    assert_eq!(client.resolve_name(WHALE).await.unwrap(), None);
    // Only the gas oracle hit the network.
    assert_eq!(fake.requests().len(), 1);
}

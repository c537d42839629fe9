use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::{ClientError, EtherscanClient};
use super::types::{
    wei_to_eth, ApiGasOracle, ApiTokenTransfer, ApiTransaction, GasPrices, TokenTransfer,
    Transaction, DISPLAY_DECIMALS,
};

/// Sort order for paged account queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Paging window for `txlist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxQuery {
    pub start_block: u64,
    pub end_block: u64,
    pub page: u32,
    pub offset: u32,
    pub sort: SortOrder,
}

impl Default for TxQuery {
    fn default() -> Self {
        Self {
            start_block: 0,
            end_block: 99_999_999,
            page: 1,
            offset: 10,
            sort: SortOrder::Desc,
        }
    }
}

impl TxQuery {
    /// Most recent `offset` transactions, newest first.
    pub fn latest(offset: u32) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }
}

/// Typed chain-data operations the analytics engines depend on.
#[async_trait]
pub trait ChainData: Send + Sync {
    /// ETH balance rounded to six fractional digits.
    async fn get_balance(&self, address: &str) -> Result<Decimal, ClientError>;

    async fn get_transactions(
        &self,
        address: &str,
        query: TxQuery,
    ) -> Result<Vec<Transaction>, ClientError>;

    async fn get_token_transfers(
        &self,
        address: &str,
        contract_address: Option<&str>,
        page: u32,
        offset: u32,
    ) -> Result<Vec<TokenTransfer>, ClientError>;

    async fn get_contract_abi(&self, address: &str) -> Result<String, ClientError>;

    async fn get_gas_prices(&self) -> Result<GasPrices, ClientError>;

    /// Etherscan has no name-resolution endpoint, so this is always `None`.
    async fn resolve_name(&self, _address: &str) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

#[async_trait]
impl ChainData for EtherscanClient {
    async fn get_balance(&self, address: &str) -> Result<Decimal, ClientError> {
        let body = self
            .request(&[
                ("module", "account".into()),
                ("action", "balance".into()),
                ("address", address.into()),
                ("tag", "latest".into()),
            ])
            .await?;

        let raw = match body.get("result") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            other => {
                return Err(ClientError::UnexpectedResponse(format!(
                    "balance result missing or not a string: {other:?}"
                )))
            }
        };

        let wei = raw
            .parse::<u128>()
            .map_err(|_| ClientError::UnexpectedResponse(format!("balance is not an integer: {raw:?}")))?;
        let eth = wei_to_eth(wei)
            .ok_or_else(|| ClientError::UnexpectedResponse(format!("balance out of range: {raw}")))?;

        Ok(eth.round_dp(DISPLAY_DECIMALS))
    }

    async fn get_transactions(
        &self,
        address: &str,
        query: TxQuery,
    ) -> Result<Vec<Transaction>, ClientError> {
        let result = self
            .request(&[
                ("module", "account".into()),
                ("action", "txlist".into()),
                ("address", address.into()),
                ("startblock", query.start_block.to_string()),
                ("endblock", query.end_block.to_string()),
                ("page", query.page.to_string()),
                ("offset", query.offset.to_string()),
                ("sort", query.sort.as_str().into()),
            ])
            .await;

        let records: Vec<ApiTransaction> = list_result(result)?;
        records.into_iter().map(Transaction::try_from).collect()
    }

    async fn get_token_transfers(
        &self,
        address: &str,
        contract_address: Option<&str>,
        page: u32,
        offset: u32,
    ) -> Result<Vec<TokenTransfer>, ClientError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "tokentx".into()),
            ("address", address.into()),
            ("page", page.to_string()),
            ("offset", offset.to_string()),
            ("sort", SortOrder::Desc.as_str().into()),
        ];
        if let Some(contract) = contract_address.filter(|c| !c.is_empty()) {
            params.push(("contractaddress", contract.into()));
        }

        let records: Vec<ApiTokenTransfer> = list_result(self.request(&params).await)?;
        records.into_iter().map(TokenTransfer::try_from).collect()
    }

    async fn get_contract_abi(&self, address: &str) -> Result<String, ClientError> {
        let body = self
            .request(&[
                ("module", "contract".into()),
                ("action", "getabi".into()),
                ("address", address.into()),
            ])
            .await?;

        body.get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::UnexpectedResponse("ABI result is not a string".into()))
    }

    async fn get_gas_prices(&self) -> Result<GasPrices, ClientError> {
        let body = self
            .request(&[("module", "gastracker".into()), ("action", "gasoracle".into())])
            .await?;

        let result = body
            .get("result")
            .cloned()
            .ok_or_else(|| ClientError::UnexpectedResponse("gas oracle result missing".into()))?;
        let oracle: ApiGasOracle = serde_json::from_value(result)
            .map_err(|e| ClientError::UnexpectedResponse(format!("gas oracle: {e}")))?;

        Ok(oracle.into())
    }
}

/// Shape a list-returning response. A missing `result`, or an upstream
/// "no records" error carrying an empty array, is an empty page.
fn list_result<T: DeserializeOwned>(
    response: Result<Value, ClientError>,
) -> Result<Vec<T>, ClientError> {
    let result = match response {
        Ok(mut body) => body.get_mut("result").map(Value::take).unwrap_or(Value::Null),
        Err(ClientError::Upstream { result: Value::Array(items), .. }) if items.is_empty() => {
            return Ok(Vec::new())
        }
        Err(e) => return Err(e),
    };

    match result {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(result)
            .map_err(|e| ClientError::UnexpectedResponse(format!("malformed record: {e}"))),
        other => Err(ClientError::UnexpectedResponse(format!(
            "expected a list result, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tx_query_defaults() {
        let q = TxQuery::default();
        assert_eq!(q.start_block, 0);
        assert_eq!(q.end_block, 99_999_999);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset, 10);
        assert_eq!(q.sort, SortOrder::Desc);
        assert_eq!(TxQuery::latest(100).offset, 100);
    }

    #[test]
    fn test_list_result_missing_is_empty() {
        let out: Vec<ApiTransaction> = list_result(Ok(json!({"status": "1"}))).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_list_result_no_records_error_is_empty() {
        let err = ClientError::Upstream {
            message: "No transactions found".into(),
            result: json!([]),
        };
        let out: Vec<ApiTransaction> = list_result(Err(err)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_list_result_rate_limit_error_propagates() {
        let err = ClientError::Upstream {
            message: "NOTOK".into(),
            result: json!("Max rate limit reached"),
        };
        let out: Result<Vec<ApiTransaction>, _> = list_result(Err(err));
        assert!(matches!(out, Err(ClientError::Upstream { .. })));
    }

    #[test]
    fn test_list_result_string_result_is_unexpected() {
        let out: Result<Vec<ApiTransaction>, _> =
            list_result(Ok(json!({"status": "1", "result": "oops"})));
        assert!(matches!(out, Err(ClientError::UnexpectedResponse(_))));
    }
}

pub mod client;
pub mod gateway;
pub mod types;

pub use client::{ClientError, EtherscanClient};
pub use gateway::{ChainData, SortOrder, TxQuery};
pub use types::{GasPrices, TokenTransfer, Transaction};

pub mod movement;
pub mod whale;

pub use movement::{ExchangeMovement, WhaleMovement};
pub use whale::{DiscoveredWhale, WhaleMetrics};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// FlowDirection
// ---------------------------------------------------------------------------

/// Direction of funds relative to an exchange wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Funds sent to the exchange.
    Deposit,
    /// Funds sent from the exchange.
    Withdrawal,
}

impl FlowDirection {
    /// Direction of a transfer as seen from `exchange`.
    pub fn relative_to(exchange: &str, to: &str) -> Self {
        if to.eq_ignore_ascii_case(exchange) {
            FlowDirection::Deposit
        } else {
            FlowDirection::Withdrawal
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::Deposit => write!(f, "deposit"),
            FlowDirection::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

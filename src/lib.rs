pub mod api;
pub mod config;
pub mod errors;
pub mod etherscan;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::etherscan::ChainData;
use crate::services::ScanPacing;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ChainData>,
    pub pacing: ScanPacing,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    /// Bearer token required on `/tools`; `None` disables auth.
    pub api_token: Option<String>,
}

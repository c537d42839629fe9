pub mod classifier;
pub mod registry;
pub mod scorer;

pub use classifier::{class_or_unknown, classify, Significance, WhaleClass};
pub use registry::{exchange_of, is_known_entity, label_of, monitored_addresses};
pub use scorer::{activity_score, risk_score, token_diversity, transaction_stats, TransactionStats};

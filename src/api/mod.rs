pub mod auth;
pub mod handlers;
pub mod reports;
pub mod router;

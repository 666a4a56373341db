// smclink-api: Async Rust client for the System Management Controller REST API

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::BasicAuth;
pub use client::SmcClient;
pub use endpoint::{Endpoint, paths};
pub use error::Error;
pub use transport::TransportConfig;

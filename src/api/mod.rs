/// Labeling server API
///
/// This module handles all traffic with the external server:
/// - Request/response wire types (types.rs)
/// - The async HTTP client (client.rs)

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::ApiClient;

/// Errors from talking to the labeling server
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, body read error
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Server answered `success: false`; shown verbatim
    #[error("{0}")]
    Server(String),

    /// Response body was not the JSON we expected
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Endpoint URL could not be built from base + route
    #[error("Invalid URL: {0}")]
    Url(String),
}

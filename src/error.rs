//! Error taxonomy for the form's three failure paths.
//!
//! None of these are fatal: each is caught at the action boundary and
//! turned into an inline message or a notification.

use reqwest::StatusCode;
use thiserror::Error;

/// The candidate string is not a dotted-quad IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid IPv4 address format: {candidate:?}")]
pub struct FormatError {
    pub candidate: String,
}

/// Fetching the caller's own public address failed.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("self-address request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("self-address service returned HTTP {0}")]
    Status(StatusCode),
    #[error("self-address response unusable: {0}")]
    Body(String),
}

/// Looking up metadata for an address failed or returned unusable data.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("lookup service returned HTTP {0}")]
    Status(StatusCode),
    #[error("lookup response is not a JSON object: {0}")]
    Body(String),
    #[error("lookup service rejected {address}: {reason}")]
    Rejected { address: String, reason: String },
}

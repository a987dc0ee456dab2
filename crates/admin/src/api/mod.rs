//! Cuztory backend REST client.
//!
//! # Architecture
//!
//! - One [`AdminApiClient`] per process, cheaply clonable
//! - Bearer token taken from the [`crate::session::Session`] on every request
//! - Raw JSON shapes live in [`wire`]; [`conversions`] turns them into the
//!   domain model once, at ingestion
//! - No client-side timeout and no retries; the operator re-triggers failed
//!   actions

pub mod analytics;
pub mod catalog;
pub mod client;
pub mod conversions;
pub mod orders;
pub mod settings;
pub mod wire;

pub use client::AdminApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// Displays as the backend's own message so refusals reach the operator
    /// unchanged.
    #[error("{message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status, when the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

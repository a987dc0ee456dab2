//! Unified error handling for the admin console.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::invoice::InvoiceError;
use crate::messaging::MessagingError;
use crate::shipment::ShipmentError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before any backend call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invoice layout or rendering failed.
    #[error("Invoice error: {0}")]
    Invoice(#[from] InvoiceError),

    /// Shipment action rejected or failed.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// Messaging link could not be built.
    #[error(transparent)]
    Messaging(#[from] MessagingError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable admin token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Operator declined a destructive action.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Resource not found locally.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// The text shown to the operator.
    ///
    /// Backend refusals are surfaced verbatim.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            Self::Api(ApiError::Backend { message, .. })
            | Self::Shipment(ShipmentError::Api(ApiError::Backend { message, .. })) => {
                message.clone()
            }
            Self::Validation(e) => e.to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether this failure points at something other than operator input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Http(_) | ApiError::Decode(_))
                | Self::Shipment(ShipmentError::Api(ApiError::Http(_) | ApiError::Decode(_)))
                | Self::Invoice(_)
                | Self::Io(_)
        )
    }

    /// Log the error and, for internal failures, capture it with Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin console error"
            );
        } else {
            tracing::warn!(error = %self, "Admin action failed");
        }
    }
}

/// Input that failed a required-field or range check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

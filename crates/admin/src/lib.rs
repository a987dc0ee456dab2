//! Cuztory admin console library.
//!
//! Everything the operator can do lives here so the CLI stays a thin shell
//! and the integration tests can drive the real client.
//!
//! # Security
//!
//! The admin token grants full control of orders, catalog and store
//! settings. It is held as a [`secrecy::SecretString`] and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod invoice;
pub mod line_items;
pub mod messaging;
pub mod models;
pub mod screens;
pub mod session;
pub mod shipment;

pub use api::{AdminApiClient, ApiError};
pub use backend::OrderBackend;
pub use config::AdminConfig;
pub use console::{ConsoleSettings, Notice, Operator, OrderConsole, OrderRow};
pub use error::{AppError, ValidationError};
pub use screens::CatalogScreens;
pub use session::Session;

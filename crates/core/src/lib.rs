//! Cuztory Core - Shared types library.
//!
//! This crate provides common types used across all Cuztory admin components:
//! - `admin` - Backend client, invoice builder and order console
//! - `cli` - Command-line operator surface (`cz-admin`)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses
//! - [`text`] - Display-text and phone-number normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod text;
pub mod types;

pub use types::*;

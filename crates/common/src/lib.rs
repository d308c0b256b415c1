//! Common utilities and types shared across the academy live-class crates.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for common data types
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the generic record-collection data-access contract
pub mod data_access;

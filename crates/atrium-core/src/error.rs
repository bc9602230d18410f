//! # Error Types — Shared Error Hierarchy
//!
//! The core error type used across the platform. Domain crates define
//! their own `thiserror` enums for state-machine and engine failures;
//! this one covers the concerns owned by `atrium-core` itself.

use thiserror::Error;

use crate::money::MoneyError;

/// Top-level error type for core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Monetary arithmetic failed.
    #[error("money error: {0}")]
    Money(#[from] MoneyError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

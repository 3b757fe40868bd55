//! `wpengine-api` — blocking client for the WP Engine account user API.
//!
//! [`Client`] implements [`usersync_core::Directory`], so the reconciliation
//! engine can drive it directly.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, ClientConfig};
pub use error::ApiError;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ApiError>;

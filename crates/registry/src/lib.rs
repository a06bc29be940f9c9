//! `textrace-registry`: the product registry client.
//!
//! Mediates between form input and the ledger: validates input, enforces the
//! terminal-status rule before anything is submitted, and keeps a small local
//! view (owned ids, last viewed product) in step with the ledger.

pub mod client;
pub mod config;
pub mod error;

pub use client::RegistryClient;
pub use config::{ConfigError, RegistryConfig};
pub use error::{RegistryError, RegistryResult};

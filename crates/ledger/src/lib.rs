//! Ledger service boundary.
//!
//! The ledger (a smart contract in production) is the system of record for
//! product data. This crate defines the client-facing shape of that service
//! and an in-memory implementation that behaves like the deployed contract.

pub mod in_memory;
pub mod service;

pub use in_memory::InMemoryLedger;
pub use service::{LedgerError, LedgerRecord, LedgerService, Receipt, TxOptions};

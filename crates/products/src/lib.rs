//! Products domain module.
//!
//! Business rules for textile product records, implemented purely as
//! deterministic domain logic (no IO, no ledger, no wallet). The ledger is the
//! system of record; this crate decides whether a requested change is allowed
//! before anything is submitted to it.

pub mod lifecycle;
pub mod product;

pub use lifecycle::{ProductStatus, TransitionPolicy};
pub use product::{IssueProduct, Product, ProductDetails, UpdateProduct};

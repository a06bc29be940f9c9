//! `textrace-core`: identifiers and errors shared by every textrace crate.
//!
//! This crate contains **pure domain** primitives (no ledger, wallet or HTTP concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, ProductId};

//! Reference catalog of known textile products.
//!
//! The catalog only pre-fills the issue form. Nothing in the registry depends
//! on it being reachable: a failed or empty fetch falls back to manual entry.

pub mod draft;
pub mod source;

pub use draft::IssueDraft;
pub use source::{load_or_empty, CatalogEntry, CatalogError, HttpCatalog, ReferenceCatalog, StaticCatalog};

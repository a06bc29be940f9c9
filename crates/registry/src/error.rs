use thiserror::Error;

use textrace_auth::WalletError;
use textrace_core::{DomainError, ProductId};
use textrace_ledger::LedgerError;
use textrace_products::ProductStatus;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Outcome of a failed registry operation.
///
/// Every variant leaves the client usable for the next operation; the
/// presentation layer decides how to show it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No wallet session is attached to the client.
    #[error("no connected account; connect a wallet first")]
    AuthenticationRequired,

    /// A required field was missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record is DELIVERED and can no longer change.
    #[error("product {0} is delivered and cannot be modified")]
    TerminalState(ProductId),

    /// The configured transition policy refuses this status change.
    #[error("status change {from} -> {to} is not allowed")]
    TransitionDenied { from: ProductStatus, to: ProductStatus },

    /// The ledger has no record with this id.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The ledger rejected the call, the transaction reverted, or it was unreachable.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The wallet handshake failed.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),
}

impl RegistryError {
    /// Map a domain error raised while checking record `id`.
    pub fn from_domain(id: ProductId, err: DomainError) -> Self {
        match err {
            DomainError::TerminalState(_) => RegistryError::TerminalState(id),
            other => other.into(),
        }
    }
}

impl From<DomainError> for RegistryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => RegistryError::Validation(msg),
            DomainError::InvalidId(msg) => RegistryError::Validation(msg),
            DomainError::InvariantViolation(msg) => RegistryError::Validation(msg),
            DomainError::TerminalState(id) => match id.parse() {
                Ok(id) => RegistryError::TerminalState(id),
                Err(_) => RegistryError::Validation(format!("record {id} is in a terminal status")),
            },
        }
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use textrace_core::{AccountId, ProductId};
use textrace_products::{IssueProduct, Product, ProductDetails, ProductStatus, UpdateProduct};

/// Gas limit attached to mutating transactions unless configured otherwise.
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

/// Per-transaction submission options.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    /// `None` lets the ledger estimate.
    pub gas_limit: Option<u64>,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            gas_limit: Some(DEFAULT_GAS_LIMIT),
        }
    }
}

impl TxOptions {
    pub fn with_gas_limit(gas_limit: u64) -> Self {
        Self {
            gas_limit: Some(gas_limit),
        }
    }
}

/// Confirmation of a mined/committed mutating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: Uuid,
    pub confirmed_at: DateTime<Utc>,
}

impl Receipt {
    pub fn confirmed_now() -> Self {
        Self {
            tx_id: Uuid::now_v7(),
            confirmed_at: Utc::now(),
        }
    }
}

/// A record as the ledger stores it.
///
/// `status_code` stays raw: the contract stores a small integer and nothing
/// stops another client from writing a value this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub owner: AccountId,
    pub name: String,
    pub origin: String,
    pub material_composition: String,
    pub production_date: DateTime<Utc>,
    pub status_code: u8,
}

impl LedgerRecord {
    pub fn status(&self) -> Result<ProductStatus, LedgerError> {
        ProductStatus::try_from(self.status_code)
            .map_err(|e| LedgerError::Decode(format!("status: {e}")))
    }

    /// Decode into the domain snapshot.
    pub fn into_product(self, id: ProductId) -> Result<Product, LedgerError> {
        let status = self.status()?;
        Ok(Product::from_details(
            id,
            self.owner,
            ProductDetails {
                name: self.name,
                origin: self.origin,
                material_composition: self.material_composition,
                production_date: self.production_date,
                status,
            },
        ))
    }
}

/// Ledger operation error.
///
/// These are **remote** failures, as opposed to domain errors (validation,
/// lifecycle rules) which the client detects before anything is submitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The transaction executed and reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The ledger refused the transaction before execution (e.g. gas, nonce).
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The ledger could not be reached or the call did not complete.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The ledger answered with data the client cannot interpret.
    #[error("undecodable ledger response: {0}")]
    Decode(String),
}

/// Remote system of record for product data.
///
/// Mutating calls return only after the ledger confirmed the transaction.
/// Implementations are free to enforce their own rules (ownership, terminal
/// status); callers must still check preconditions before submitting, since a
/// reverted transaction may already have cost the caller.
#[async_trait::async_trait]
pub trait LedgerService: Send + Sync {
    /// Issue a record owned by `caller`; the ledger assigns id, production
    /// date, and the initial status.
    async fn create_record(
        &self,
        caller: &AccountId,
        record: &IssueProduct,
        opts: TxOptions,
    ) -> Result<(ProductId, Receipt), LedgerError>;

    async fn update_record(
        &self,
        caller: &AccountId,
        update: &UpdateProduct,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError>;

    async fn delete_record(
        &self,
        caller: &AccountId,
        id: ProductId,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError>;

    /// `Ok(None)` when no such record exists (never issued, or deleted).
    async fn read_record(&self, id: ProductId) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Ids currently owned by `owner`, ascending. Empty when none.
    async fn list_records_by_owner(&self, owner: &AccountId) -> Result<Vec<ProductId>, LedgerError>;
}

#[async_trait::async_trait]
impl<S> LedgerService for Arc<S>
where
    S: LedgerService + ?Sized,
{
    async fn create_record(
        &self,
        caller: &AccountId,
        record: &IssueProduct,
        opts: TxOptions,
    ) -> Result<(ProductId, Receipt), LedgerError> {
        (**self).create_record(caller, record, opts).await
    }

    async fn update_record(
        &self,
        caller: &AccountId,
        update: &UpdateProduct,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        (**self).update_record(caller, update, opts).await
    }

    async fn delete_record(
        &self,
        caller: &AccountId,
        id: ProductId,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        (**self).delete_record(caller, id, opts).await
    }

    async fn read_record(&self, id: ProductId) -> Result<Option<LedgerRecord>, LedgerError> {
        (**self).read_record(id).await
    }

    async fn list_records_by_owner(&self, owner: &AccountId) -> Result<Vec<ProductId>, LedgerError> {
        (**self).list_records_by_owner(owner).await
    }
}

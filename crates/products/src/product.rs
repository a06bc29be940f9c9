use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use textrace_core::{AccountId, DomainError, DomainResult, Entity, ProductId};

use crate::lifecycle::ProductStatus;

/// Point-in-time read of a record, as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub origin: String,
    pub material_composition: String,
    pub production_date: DateTime<Utc>,
    pub status: ProductStatus,
}

/// A textile product record.
///
/// The ledger owns the record; a `Product` is only a cached snapshot and is
/// never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    origin: String,
    material_composition: String,
    production_date: DateTime<Utc>,
    status: ProductStatus,
    owner: AccountId,
}

impl Product {
    pub fn from_details(id: ProductId, owner: AccountId, details: ProductDetails) -> Self {
        Self {
            id,
            name: details.name,
            origin: details.origin,
            material_composition: details.material_composition,
            production_date: details.production_date,
            status: details.status,
            owner,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn material_composition(&self) -> &str {
        &self.material_composition
    }

    pub fn production_date(&self) -> DateTime<Utc> {
        self.production_date
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Fail with `TerminalState` once the record has been delivered.
    pub fn ensure_mutable(&self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::terminal(self.id));
        }
        Ok(())
    }

    /// Preconditions for submitting `cmd` against this snapshot.
    ///
    /// Covers record identity and the terminal rule. Which status moves are
    /// allowed is a separate `TransitionPolicy` decision.
    pub fn check_update(&self, cmd: &UpdateProduct) -> DomainResult<()> {
        if cmd.product_id != self.id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        self.ensure_mutable()
    }

    pub fn check_delete(&self) -> DomainResult<()> {
        self.ensure_mutable()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: IssueProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueProduct {
    pub name: String,
    pub origin: String,
    pub material_composition: String,
}

impl IssueProduct {
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        material_composition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            material_composition: material_composition.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        DomainError::require_non_empty("name", &self.name)?;
        DomainError::require_non_empty("origin", &self.origin)?;
        DomainError::require_non_empty("material composition", &self.material_composition)?;
        Ok(())
    }
}

/// Command: UpdateProduct (full replacement of the mutable fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub origin: String,
    pub material_composition: String,
    pub status: ProductStatus,
}

impl UpdateProduct {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        origin: impl Into<String>,
        material_composition: impl Into<String>,
        status: ProductStatus,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            origin: origin.into(),
            material_composition: material_composition.into(),
            status,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        DomainError::require_non_empty("new name", &self.name)?;
        DomainError::require_non_empty("new origin", &self.origin)?;
        DomainError::require_non_empty("new material composition", &self.material_composition)?;
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use chrono::{SubsecRound, Utc};

use textrace_core::{AccountId, ProductId};
use textrace_products::{IssueProduct, ProductStatus, UpdateProduct};

use crate::service::{LedgerError, LedgerRecord, LedgerService, Receipt, TxOptions};

/// Gas below which a transaction is refused outright.
const INTRINSIC_GAS: u64 = 21_000;

#[derive(Debug)]
struct LedgerState {
    next_id: u64,
    records: BTreeMap<ProductId, LedgerRecord>,
}

/// In-memory ledger that behaves like the deployed product contract.
///
/// Intended for tests/dev. Ids are sequential from 1 (or from the seed given
/// to [`InMemoryLedger::with_next_id`]) and are never reused. The contract's
/// own guards are reproduced: only the owner may mutate a record, missing
/// records revert, and delivered records are frozen.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    injected_failure: Mutex<Option<LedgerError>>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::with_next_id(1)
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start id assignment at `next_id` (as if earlier records existed).
    pub fn with_next_id(next_id: u64) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                next_id,
                records: BTreeMap::new(),
            }),
            injected_failure: Mutex::new(None),
        }
    }

    /// Make the next call (of any kind) fail with `err`.
    pub fn fail_next(&self, err: LedgerError) {
        if let Ok(mut slot) = self.injected_failure.lock() {
            *slot = Some(err);
        }
    }

    /// Number of records currently stored.
    pub fn record_count(&self) -> usize {
        self.state.read().map(|s| s.records.len()).unwrap_or(0)
    }

    fn take_injected_failure(&self) -> Result<(), LedgerError> {
        let mut slot = self
            .injected_failure
            .lock()
            .map_err(|_| LedgerError::Transport("lock poisoned".to_string()))?;
        match slot.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_gas(opts: TxOptions) -> Result<(), LedgerError> {
        match opts.gas_limit {
            Some(limit) if limit < INTRINSIC_GAS => Err(LedgerError::Rejected(format!(
                "intrinsic gas too low: have {limit}, want {INTRINSIC_GAS}"
            ))),
            _ => Ok(()),
        }
    }

    fn writable<'a>(
        records: &'a mut BTreeMap<ProductId, LedgerRecord>,
        caller: &AccountId,
        id: ProductId,
    ) -> Result<&'a mut LedgerRecord, LedgerError> {
        let record = records
            .get_mut(&id)
            .ok_or_else(|| LedgerError::Reverted(format!("product {id} does not exist")))?;
        if &record.owner != caller {
            return Err(LedgerError::Reverted(format!(
                "caller {caller} is not the owner of product {id}"
            )));
        }
        if record.status_code == ProductStatus::Delivered.code() {
            return Err(LedgerError::Reverted(format!("product {id} is already delivered")));
        }
        Ok(record)
    }
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Transport("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl LedgerService for InMemoryLedger {
    async fn create_record(
        &self,
        caller: &AccountId,
        record: &IssueProduct,
        opts: TxOptions,
    ) -> Result<(ProductId, Receipt), LedgerError> {
        self.take_injected_failure()?;
        Self::check_gas(opts)?;

        let mut state = self.state.write().map_err(poisoned)?;
        let id = ProductId::new(state.next_id);
        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or_else(|| LedgerError::Rejected("product id space exhausted".to_string()))?;
        state.records.insert(
            id,
            LedgerRecord {
                owner: caller.clone(),
                name: record.name.clone(),
                origin: record.origin.clone(),
                material_composition: record.material_composition.clone(),
                production_date: Utc::now().trunc_subsecs(0),
                status_code: ProductStatus::InProduction.code(),
            },
        );

        tracing::debug!(%id, owner = %caller, "ledger: record created");
        Ok((id, Receipt::confirmed_now()))
    }

    async fn update_record(
        &self,
        caller: &AccountId,
        update: &UpdateProduct,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        self.take_injected_failure()?;
        Self::check_gas(opts)?;

        let mut state = self.state.write().map_err(poisoned)?;
        let record = Self::writable(&mut state.records, caller, update.product_id)?;
        record.name = update.name.clone();
        record.origin = update.origin.clone();
        record.material_composition = update.material_composition.clone();
        record.status_code = update.status.code();

        tracing::debug!(id = %update.product_id, status = %update.status, "ledger: record updated");
        Ok(Receipt::confirmed_now())
    }

    async fn delete_record(
        &self,
        caller: &AccountId,
        id: ProductId,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        self.take_injected_failure()?;
        Self::check_gas(opts)?;

        let mut state = self.state.write().map_err(poisoned)?;
        Self::writable(&mut state.records, caller, id)?;
        state.records.remove(&id);

        tracing::debug!(%id, "ledger: record deleted");
        Ok(Receipt::confirmed_now())
    }

    async fn read_record(&self, id: ProductId) -> Result<Option<LedgerRecord>, LedgerError> {
        self.take_injected_failure()?;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.records.get(&id).cloned())
    }

    async fn list_records_by_owner(&self, owner: &AccountId) -> Result<Vec<ProductId>, LedgerError> {
        self.take_injected_failure()?;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .records
            .iter()
            .filter(|(_, r)| &r.owner == owner)
            .map(|(id, _)| *id)
            .collect())
    }
}

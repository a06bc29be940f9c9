//! Registry client: session handling and the product operations.
//!
//! ## Mutation flow
//!
//! ```text
//! operation
//!   ↓
//! 1. Require a session (no session → AuthenticationRequired, nothing sent)
//!   ↓
//! 2. Validate input (→ Validation, nothing sent)
//!   ↓
//! 3. Read the current record and check lifecycle rules
//!    (→ NotFound / TerminalState / TransitionDenied, nothing sent)
//!   ↓
//! 4. Submit and wait for confirmation (→ Ledger)
//!   ↓
//! 5. Refresh the owned-id list and the cached detail view
//! ```
//!
//! Step 3 reads the ledger immediately before submitting. Another session can
//! still change the record between the read and the submission; the ledger's
//! own ordering is the only serialisation point for that race.

use textrace_auth::{Session, WalletProvider};
use textrace_catalog::IssueDraft;
use textrace_core::{AccountId, ProductId};
use textrace_ledger::{LedgerService, TxOptions};
use textrace_products::{IssueProduct, Product, ProductStatus, TransitionPolicy, UpdateProduct};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Product registry client.
///
/// Holds at most one [`Session`]. Mutating operations take `&mut self`, so a
/// client can only have one of them in flight at a time.
#[derive(Debug)]
pub struct RegistryClient<L> {
    ledger: L,
    tx_options: TxOptions,
    policy: TransitionPolicy,
    session: Option<Session>,
    owned_ids: Vec<ProductId>,
    selected: Option<Product>,
}

impl<L> RegistryClient<L> {
    pub fn new(ledger: L, config: &RegistryConfig) -> Self {
        Self {
            ledger,
            tx_options: config.tx_options(),
            policy: config.transition_policy,
            session: None,
            owned_ids: Vec::new(),
            selected: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Ids owned by the session's account, as of the last refresh.
    pub fn owned_ids(&self) -> &[ProductId] {
        &self.owned_ids
    }

    /// The product last fetched with [`RegistryClient::get`].
    pub fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    /// Drop the session and everything cached on its behalf.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(account = %session.account(), "wallet disconnected");
        }
        self.owned_ids.clear();
        self.selected = None;
    }

    fn caller(&self) -> RegistryResult<AccountId> {
        self.session
            .as_ref()
            .map(|s| s.account().clone())
            .ok_or(RegistryError::AuthenticationRequired)
    }
}

impl<L> RegistryClient<L>
where
    L: LedgerService,
{
    /// Prompt the wallet for an account and attach a new session.
    pub async fn connect<W>(&mut self, wallet: &W) -> RegistryResult<Session>
    where
        W: WalletProvider + ?Sized,
    {
        let session = Session::connect(wallet).await?;
        self.attach(session.clone()).await;
        Ok(session)
    }

    /// Attach a session for an account the wallet already authorised.
    ///
    /// Returns `Ok(None)` (and stays disconnected) when there is none.
    pub async fn restore<W>(&mut self, wallet: &W) -> RegistryResult<Option<Session>>
    where
        W: WalletProvider + ?Sized,
    {
        match Session::restore(wallet).await? {
            Some(session) => {
                self.attach(session.clone()).await;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn attach(&mut self, session: Session) {
        self.owned_ids.clear();
        self.selected = None;
        self.session = Some(session);
        self.refresh_owned().await;
    }

    /// Issue a new record owned by the session's account.
    pub async fn issue(
        &mut self,
        name: &str,
        origin: &str,
        material_composition: &str,
    ) -> RegistryResult<ProductId> {
        self.submit_issue(IssueProduct::new(name, origin, material_composition))
            .await
    }

    /// Issue a record from the (possibly catalog pre-filled) issue form.
    pub async fn issue_draft(&mut self, draft: IssueDraft) -> RegistryResult<ProductId> {
        self.submit_issue(draft.into_command()).await
    }

    async fn submit_issue(&mut self, cmd: IssueProduct) -> RegistryResult<ProductId> {
        let caller = self.caller()?;
        cmd.validate()?;

        let (id, receipt) = self
            .ledger
            .create_record(&caller, &cmd, self.tx_options)
            .await?;
        tracing::info!(%id, tx = %receipt.tx_id, owner = %caller, "product issued");

        self.refresh_owned().await;
        Ok(id)
    }

    /// Replace the mutable fields and status of record `id`.
    pub async fn update(
        &mut self,
        id: ProductId,
        name: &str,
        origin: &str,
        material_composition: &str,
        status: ProductStatus,
    ) -> RegistryResult<()> {
        let caller = self.caller()?;
        let cmd = UpdateProduct::new(id, name, origin, material_composition, status);
        cmd.validate()?;

        let current = self.snapshot(id).await?;
        current
            .check_update(&cmd)
            .map_err(|e| RegistryError::from_domain(id, e))?;
        if !self.policy.allows(current.status(), cmd.status) {
            return Err(RegistryError::TransitionDenied {
                from: current.status(),
                to: cmd.status,
            });
        }

        let receipt = self
            .ledger
            .update_record(&caller, &cmd, self.tx_options)
            .await?;
        tracing::info!(%id, tx = %receipt.tx_id, status = %cmd.status, "product updated");

        self.refresh_owned().await;
        if self.selected.as_ref().is_some_and(|p| p.id_typed() == id) {
            self.refresh_selected(id).await;
        }
        Ok(())
    }

    /// Delete record `id`.
    pub async fn delete(&mut self, id: ProductId) -> RegistryResult<()> {
        let caller = self.caller()?;

        let current = self.snapshot(id).await?;
        current
            .check_delete()
            .map_err(|e| RegistryError::from_domain(id, e))?;

        let receipt = self
            .ledger
            .delete_record(&caller, id, self.tx_options)
            .await?;
        tracing::info!(%id, tx = %receipt.tx_id, "product deleted");

        self.refresh_owned().await;
        if self.selected.as_ref().is_some_and(|p| p.id_typed() == id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Read the current snapshot of record `id` and keep it as the selected product.
    pub async fn get(&mut self, id: ProductId) -> RegistryResult<Product> {
        let product = self.snapshot(id).await?;
        self.selected = Some(product.clone());
        Ok(product)
    }

    /// All ids owned by `account`; empty when it owns nothing.
    pub async fn list_owned(&self, account: &AccountId) -> RegistryResult<Vec<ProductId>> {
        Ok(self.ledger.list_records_by_owner(account).await?)
    }

    async fn snapshot(&self, id: ProductId) -> RegistryResult<Product> {
        let record = self
            .ledger
            .read_record(id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;
        Ok(record.into_product(id)?)
    }

    // Same contract as `refresh_owned`: a failed re-read keeps the previous view.
    async fn refresh_selected(&mut self, id: ProductId) {
        match self.snapshot(id).await {
            Ok(product) => self.selected = Some(product),
            Err(err) => {
                tracing::warn!(%id, error = %err, "failed to refresh selected product");
            }
        }
    }

    // Runs after a confirmed mutation: the ledger already changed, so a failed
    // refresh is logged and the previous list is kept.
    async fn refresh_owned(&mut self) {
        let Some(account) = self.session.as_ref().map(|s| s.account().clone()) else {
            return;
        };
        match self.ledger.list_records_by_owner(&account).await {
            Ok(ids) => self.owned_ids = ids,
            Err(err) => {
                tracing::warn!(%account, error = %err, "failed to refresh owned product ids");
            }
        }
    }
}

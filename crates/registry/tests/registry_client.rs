use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use textrace_auth::StaticWallet;
use textrace_catalog::{CatalogEntry, IssueDraft};
use textrace_core::{AccountId, ProductId};
use textrace_ledger::{
    InMemoryLedger, LedgerError, LedgerRecord, LedgerService, Receipt, TxOptions,
};
use textrace_products::{IssueProduct, ProductStatus, TransitionPolicy, UpdateProduct};
use textrace_registry::{RegistryClient, RegistryConfig, RegistryError};

/// Ledger wrapper that counts every call reaching the ledger.
#[derive(Debug, Default)]
struct RecordingLedger {
    inner: InMemoryLedger,
    fail_lists: AtomicBool,
    fail_reads_after_update: AtomicBool,
    fail_reads: AtomicBool,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    reads: AtomicUsize,
    lists: AtomicUsize,
}

impl RecordingLedger {
    fn seeded(next_id: u64) -> Self {
        Self {
            inner: InMemoryLedger::with_next_id(next_id),
            ..Default::default()
        }
    }

    fn mutations(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn total_calls(&self) -> usize {
        self.mutations() + self.reads.load(Ordering::SeqCst) + self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LedgerService for RecordingLedger {
    async fn create_record(
        &self,
        caller: &AccountId,
        record: &IssueProduct,
        opts: TxOptions,
    ) -> Result<(ProductId, Receipt), LedgerError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_record(caller, record, opts).await
    }

    async fn update_record(
        &self,
        caller: &AccountId,
        update: &UpdateProduct,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let receipt = self.inner.update_record(caller, update, opts).await?;
        if self.fail_reads_after_update.load(Ordering::SeqCst) {
            self.fail_reads.store(true, Ordering::SeqCst);
        }
        Ok(receipt)
    }

    async fn delete_record(
        &self,
        caller: &AccountId,
        id: ProductId,
        opts: TxOptions,
    ) -> Result<Receipt, LedgerError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_record(caller, id, opts).await
    }

    async fn read_record(&self, id: ProductId) -> Result<Option<LedgerRecord>, LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("timeout".to_string()));
        }
        self.inner.read_record(id).await
    }

    async fn list_records_by_owner(&self, owner: &AccountId) -> Result<Vec<ProductId>, LedgerError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("timeout".to_string()));
        }
        self.inner.list_records_by_owner(owner).await
    }
}

fn account_a() -> AccountId {
    "0x000000000000000000000000000000000000000a".parse().unwrap()
}

fn account_b() -> AccountId {
    "0x000000000000000000000000000000000000000b".parse().unwrap()
}

async fn connected(ledger: Arc<RecordingLedger>, config: &RegistryConfig) -> RegistryClient<Arc<RecordingLedger>> {
    let mut client = RegistryClient::new(ledger, config);
    client.connect(&StaticWallet::new(account_a())).await.unwrap();
    client
}

async fn deliver(client: &mut RegistryClient<Arc<RecordingLedger>>, id: ProductId) {
    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::Delivered)
        .await
        .unwrap();
}

#[tokio::test]
async fn cotton_shirt_lifecycle_scenario() {
    let ledger = Arc::new(RecordingLedger::seeded(7));
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;

    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();
    assert_eq!(id, ProductId::new(7));

    let product = client.get(id).await.unwrap();
    assert_eq!(product.status(), ProductStatus::InProduction);
    assert_eq!(product.status().code(), 0);
    assert_eq!(product.owner(), &account_a());

    deliver(&mut client, id).await;

    let mutations_before = ledger.mutations();
    assert_eq!(
        client
            .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::InTransit)
            .await,
        Err(RegistryError::TerminalState(id))
    );
    assert_eq!(client.delete(id).await, Err(RegistryError::TerminalState(id)));
    assert_eq!(ledger.mutations(), mutations_before);
}

#[tokio::test]
async fn delivered_record_refuses_every_update_status() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Wool Coat", "Scotland", "100% Wool").await.unwrap();
    deliver(&mut client, id).await;

    let mutations_before = ledger.mutations();
    for status in ProductStatus::ALL {
        let result = client.update(id, "Wool Coat", "Scotland", "100% Wool", status).await;
        assert_eq!(result, Err(RegistryError::TerminalState(id)), "status {status}");
    }
    assert_eq!(ledger.mutations(), mutations_before);
    assert_eq!(
        client.get(id).await.unwrap().status(),
        ProductStatus::Delivered
    );
}

#[tokio::test]
async fn issue_with_empty_field_makes_no_ledger_call() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let calls_before = ledger.total_calls();

    for (name, origin, material) in [
        ("", "India", "100% Cotton"),
        ("Cotton Shirt", "", "100% Cotton"),
        ("Cotton Shirt", "India", "   "),
    ] {
        match client.issue(name, origin, material).await {
            Err(RegistryError::Validation(_)) => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }
    assert_eq!(ledger.total_calls(), calls_before);
}

#[tokio::test]
async fn issued_id_appears_in_owned_list() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;

    let id = client.issue("Silk Scarf", "China", "100% Silk").await.unwrap();

    assert!(client.list_owned(&account_a()).await.unwrap().contains(&id));
    assert_eq!(client.owned_ids(), &[id]);
}

#[tokio::test]
async fn list_owned_is_empty_for_account_without_records() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    client.issue("Silk Scarf", "China", "100% Silk").await.unwrap();

    assert_eq!(client.list_owned(&account_b()).await, Ok(vec![]));
}

#[tokio::test]
async fn update_is_reflected_by_get() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();

    client
        .update(id, "Organic Shirt", "Bangladesh", "100% Organic Cotton", ProductStatus::InTransit)
        .await
        .unwrap();

    let product = client.get(id).await.unwrap();
    assert_eq!(product.name(), "Organic Shirt");
    assert_eq!(product.origin(), "Bangladesh");
    assert_eq!(product.material_composition(), "100% Organic Cotton");
    assert_eq!(product.status(), ProductStatus::InTransit);
}

#[tokio::test]
async fn update_keeps_production_date_and_owner() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();
    let issued = client.get(id).await.unwrap();

    for status in [ProductStatus::QualityCheck, ProductStatus::InTransit, ProductStatus::Delivered] {
        client
            .update(id, "Organic Shirt", "Bangladesh", "100% Organic Cotton", status)
            .await
            .unwrap();

        let current = client.get(id).await.unwrap();
        assert_eq!(current.status(), status);
        assert_eq!(current.production_date(), issued.production_date());
        assert_eq!(current.owner(), issued.owner());
        assert_eq!(current.owner(), &account_a());
    }
}

#[tokio::test]
async fn failed_reread_after_update_keeps_selected_view() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();
    client.get(id).await.unwrap();

    ledger.fail_reads_after_update.store(true, Ordering::SeqCst);
    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::QualityCheck)
        .await
        .unwrap();

    let selected = client.selected().expect("selected view is kept");
    assert_eq!(selected.id_typed(), id);
    assert_eq!(selected.status(), ProductStatus::InProduction);
}

#[tokio::test]
async fn unrestricted_policy_allows_moving_status_backwards() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();

    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::InTransit)
        .await
        .unwrap();
    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::InProduction)
        .await
        .unwrap();

    assert_eq!(client.get(id).await.unwrap().status(), ProductStatus::InProduction);
}

#[tokio::test]
async fn forward_only_policy_denies_backwards_move_before_submission() {
    let ledger = Arc::new(RecordingLedger::default());
    let config = RegistryConfig {
        transition_policy: TransitionPolicy::ForwardOnly,
        ..RegistryConfig::default()
    };
    let mut client = connected(ledger.clone(), &config).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();
    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::InTransit)
        .await
        .unwrap();

    let mutations_before = ledger.mutations();
    assert_eq!(
        client
            .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::QualityCheck)
            .await,
        Err(RegistryError::TransitionDenied {
            from: ProductStatus::InTransit,
            to: ProductStatus::QualityCheck,
        })
    );
    assert_eq!(ledger.mutations(), mutations_before);
}

#[tokio::test]
async fn deleted_record_is_not_found() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Hemp Bag", "Nepal", "100% Hemp").await.unwrap();

    client.delete(id).await.unwrap();

    assert_eq!(client.get(id).await, Err(RegistryError::NotFound(id)));
    assert!(!client.owned_ids().contains(&id));
}

#[tokio::test]
async fn update_and_delete_of_unknown_record_are_not_found() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let missing = ProductId::new(404);

    assert_eq!(
        client
            .update(missing, "Shirt", "India", "Cotton", ProductStatus::QualityCheck)
            .await,
        Err(RegistryError::NotFound(missing))
    );
    assert_eq!(client.delete(missing).await, Err(RegistryError::NotFound(missing)));
    assert_eq!(ledger.mutations(), 0);
}

#[tokio::test]
async fn update_without_session_makes_no_network_call() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = RegistryClient::new(ledger.clone(), &RegistryConfig::default());

    assert_eq!(
        client
            .update(ProductId::new(1), "Shirt", "India", "Cotton", ProductStatus::InTransit)
            .await,
        Err(RegistryError::AuthenticationRequired)
    );
    assert_eq!(client.delete(ProductId::new(1)).await, Err(RegistryError::AuthenticationRequired));
    assert_eq!(
        client.issue("Shirt", "India", "Cotton").await,
        Err(RegistryError::AuthenticationRequired)
    );
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn ledger_failure_is_surfaced_and_client_stays_usable() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();
    let owned_before = client.owned_ids().to_vec();

    ledger
        .inner
        .fail_next(LedgerError::Transport("connection refused".to_string()));
    match client.issue("Linen Shirt", "Italy", "100% Linen").await {
        Err(RegistryError::Ledger(LedgerError::Transport(msg))) => {
            assert_eq!(msg, "connection refused")
        }
        other => panic!("Expected Ledger transport error, got {other:?}"),
    }
    assert_eq!(client.owned_ids(), owned_before.as_slice());

    // Next operation goes through normally.
    client
        .update(id, "Cotton Shirt", "India", "100% Cotton", ProductStatus::QualityCheck)
        .await
        .unwrap();
}

#[tokio::test]
async fn reverted_mutation_is_a_ledger_error() {
    let ledger = Arc::new(RecordingLedger::default());
    let config = RegistryConfig {
        gas_limit: 1_000,
        ..RegistryConfig::default()
    };
    let mut client = connected(ledger.clone(), &config).await;

    match client.issue("Cotton Shirt", "India", "100% Cotton").await {
        Err(RegistryError::Ledger(LedgerError::Rejected(msg))) => assert!(msg.contains("gas")),
        other => panic!("Expected Ledger rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn mutation_by_non_owner_reverts_on_ledger() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut owner = connected(ledger.clone(), &RegistryConfig::default()).await;
    let id = owner.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();

    let mut intruder = RegistryClient::new(ledger.clone(), &RegistryConfig::default());
    intruder.connect(&StaticWallet::new(account_b())).await.unwrap();

    match intruder.delete(id).await {
        Err(RegistryError::Ledger(LedgerError::Reverted(msg))) => assert!(msg.contains("not the owner")),
        other => panic!("Expected Ledger revert, got {other:?}"),
    }
    assert!(owner.get(id).await.is_ok());
}

#[tokio::test]
async fn failed_refresh_after_issue_still_reports_success() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let first = client.issue("Cotton Shirt", "India", "100% Cotton").await.unwrap();

    // The create is confirmed; only the follow-up listing fails.
    ledger.fail_lists.store(true, Ordering::SeqCst);
    let second = client.issue("Linen Shirt", "Italy", "100% Linen").await.unwrap();
    assert_eq!(client.owned_ids(), &[first]);

    ledger.fail_lists.store(false, Ordering::SeqCst);
    let third = client.issue("Hemp Bag", "Nepal", "100% Hemp").await.unwrap();
    assert_eq!(client.owned_ids(), &[first, second, third]);
}

#[tokio::test]
async fn catalog_draft_issues_prefilled_record() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = connected(ledger.clone(), &RegistryConfig::default()).await;
    let entries = vec![CatalogEntry {
        product_name: "Denim Jacket".to_string(),
        origin: "Turkey".to_string(),
        material_composition: "98% Cotton, 2% Elastane".to_string(),
    }];

    let id = client
        .issue_draft(IssueDraft::from_selection(&entries, "Denim Jacket"))
        .await
        .unwrap();
    let product = client.get(id).await.unwrap();
    assert_eq!(product.origin(), "Turkey");

    assert!(matches!(
        client.issue_draft(IssueDraft::from_selection(&entries, "")).await,
        Err(RegistryError::Validation(_))
    ));
}

#[tokio::test]
async fn wallet_rejection_leaves_client_disconnected() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = RegistryClient::new(ledger.clone(), &RegistryConfig::default());
    let wallet = StaticWallet::new(account_a());
    wallet.set_approve(false);

    assert!(matches!(client.connect(&wallet).await, Err(RegistryError::Wallet(_))));
    assert!(client.session().is_none());
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn restore_reattaches_previously_authorised_account() {
    let ledger = Arc::new(RecordingLedger::default());
    let mut client = RegistryClient::new(ledger.clone(), &RegistryConfig::default());
    let wallet = StaticWallet::connected(account_a());

    let session = client.restore(&wallet).await.unwrap().unwrap();
    assert_eq!(session.account(), &account_a());
    assert_eq!(wallet.request_count(), 0);
    assert!(client.issue("Cotton Shirt", "India", "100% Cotton").await.is_ok());
}

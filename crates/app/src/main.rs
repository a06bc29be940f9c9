//! Development harness: runs the registry client against the in-memory ledger.
//!
//! `textrace [catalog product name]` connects a local wallet, issues the
//! selected catalog entry (or a built-in sample when the catalog is
//! unavailable), walks it through the lifecycle, and prints each snapshot as
//! JSON.

use anyhow::Context;

use textrace_auth::StaticWallet;
use textrace_catalog::{load_or_empty, HttpCatalog, IssueDraft};
use textrace_core::AccountId;
use textrace_ledger::InMemoryLedger;
use textrace_products::ProductStatus;
use textrace_registry::{RegistryClient, RegistryConfig};

const DEV_ACCOUNT: &str = "0x00000000000000000000000000000000000000de";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    textrace_observability::init();

    let config = RegistryConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        contract = %config.contract_address,
        policy = config.transition_policy.as_str(),
        "starting textrace dev harness"
    );

    let account: AccountId = std::env::var("TEXTRACE_DEV_ACCOUNT")
        .unwrap_or_else(|_| DEV_ACCOUNT.to_string())
        .parse()
        .context("TEXTRACE_DEV_ACCOUNT")?;

    let entries = load_or_empty(&HttpCatalog::new(config.catalog_url.clone())).await;
    let selection = std::env::args()
        .nth(1)
        .or_else(|| entries.first().map(|e| e.product_name.clone()))
        .unwrap_or_default();

    let mut draft = IssueDraft::from_selection(&entries, &selection);
    if draft == IssueDraft::default() {
        tracing::info!("no catalog entry selected; using sample product");
        draft = IssueDraft {
            product_name: "Cotton Shirt".to_string(),
            origin: "India".to_string(),
            material_composition: "100% Cotton".to_string(),
        };
    }

    let mut client = RegistryClient::new(InMemoryLedger::new(), &config);
    client.connect(&StaticWallet::new(account)).await?;

    let id = client.issue_draft(draft).await?;
    let product = client.get(id).await?;

    for status in ProductStatus::ALL.into_iter().skip(1) {
        client
            .update(
                id,
                product.name(),
                product.origin(),
                product.material_composition(),
                status,
            )
            .await?;
        let snapshot = client.get(id).await?;
        println!("{}", serde_json::to_string(&snapshot)?);
    }

    if let Err(err) = client.delete(id).await {
        tracing::info!(%id, error = %err, "delivered product is frozen");
    }

    Ok(())
}

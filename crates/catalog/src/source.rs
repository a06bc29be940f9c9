use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One candidate product in the reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub product_name: String,
    pub origin: String,
    pub material_composition: String,
}

/// Wire envelope of the hosted dataset (`{"data": [...]}`).
#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    data: Vec<CatalogEntry>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog API error {0}: {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Read-only source of catalog entries.
#[async_trait::async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn entries(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Catalog served over HTTP as a JSON document.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    url: String,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Decode a response body. A body without `data` is an empty catalog.
    pub fn parse_body(body: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        serde_json::from_str::<CatalogEnvelope>(body)
            .map(|envelope| envelope.data)
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ReferenceCatalog for HttpCatalog {
    async fn entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CatalogError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Self::parse_body(&body)
    }
}

/// Fixed in-process catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait::async_trait]
impl ReferenceCatalog for StaticCatalog {
    async fn entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.entries.clone())
    }
}

/// Fetch the catalog, degrading any failure to an empty list.
pub async fn load_or_empty<C>(catalog: &C) -> Vec<CatalogEntry>
where
    C: ReferenceCatalog + ?Sized,
{
    match catalog.entries().await {
        Ok(entries) => {
            if entries.is_empty() {
                tracing::warn!("reference catalog returned an empty dataset; falling back to manual entry");
            }
            entries
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load reference catalog; falling back to manual entry");
            Vec::new()
        }
    }
}

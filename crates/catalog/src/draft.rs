use serde::{Deserialize, Serialize};

use textrace_products::IssueProduct;

use crate::source::CatalogEntry;

/// Editable contents of the issue form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub product_name: String,
    pub origin: String,
    pub material_composition: String,
}

impl IssueDraft {
    /// Pre-fill from the catalog entry named `selected`.
    ///
    /// An empty selection, or a name the catalog does not know, clears the form.
    pub fn from_selection(entries: &[CatalogEntry], selected: &str) -> Self {
        if selected.is_empty() {
            return Self::default();
        }
        entries
            .iter()
            .find(|e| e.product_name == selected)
            .map(Self::from)
            .unwrap_or_default()
    }

    pub fn into_command(self) -> IssueProduct {
        IssueProduct::new(self.product_name, self.origin, self.material_composition)
    }
}

impl From<&CatalogEntry> for IssueDraft {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            product_name: entry.product_name.clone(),
            origin: entry.origin.clone(),
            material_composition: entry.material_composition.clone(),
        }
    }
}

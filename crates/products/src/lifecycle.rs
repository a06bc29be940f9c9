//! Product status lifecycle.
//!
//! ```text
//! IN_PRODUCTION(0) -> QUALITY_CHECK(1) -> IN_TRANSIT(2) -> DELIVERED(3)
//! ```
//!
//! `DELIVERED` is terminal. How the non-terminal states may move between each
//! other is decided by a [`TransitionPolicy`].

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use textrace_core::DomainError;

/// Product status lifecycle, ordered by its numeric ledger code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ProductStatus {
    #[default]
    InProduction = 0,
    QualityCheck = 1,
    InTransit = 2,
    Delivered = 3,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::InProduction,
        ProductStatus::QualityCheck,
        ProductStatus::InTransit,
        ProductStatus::Delivered,
    ];

    /// Numeric code as stored by the ledger.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProductStatus::InProduction => "IN_PRODUCTION",
            ProductStatus::QualityCheck => "QUALITY_CHECK",
            ProductStatus::InTransit => "IN_TRANSIT",
            ProductStatus::Delivered => "DELIVERED",
        }
    }

    /// Whether the record is frozen (no update, no delete).
    pub const fn is_terminal(self) -> bool {
        matches!(self, ProductStatus::Delivered)
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for ProductStatus {
    type Error = DomainError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown status code {code}")))
    }
}

impl From<ProductStatus> for u8 {
    fn from(value: ProductStatus) -> Self {
        value.code()
    }
}

/// Which status changes an update may request.
///
/// Both policies refuse every change out of a terminal status; the policy only
/// governs moves between non-terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionPolicy {
    /// Any non-terminal status may be set to any status.
    #[default]
    Unrestricted,
    /// A status may stay where it is or move forward, never backwards.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn allows(self, from: ProductStatus, to: ProductStatus) -> bool {
        if from.is_terminal() {
            return false;
        }
        match self {
            TransitionPolicy::Unrestricted => true,
            TransitionPolicy::ForwardOnly => forward_only_table(from, to),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionPolicy::Unrestricted => "unrestricted",
            TransitionPolicy::ForwardOnly => "forward-only",
        }
    }
}

// Rows: current status, columns: requested status.
fn forward_only_table(from: ProductStatus, to: ProductStatus) -> bool {
    use ProductStatus::*;
    match (from, to) {
        (InProduction, _) => true,
        (QualityCheck, QualityCheck | InTransit | Delivered) => true,
        (InTransit, InTransit | Delivered) => true,
        _ => false,
    }
}

impl FromStr for TransitionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unrestricted" => Ok(TransitionPolicy::Unrestricted),
            "forward-only" | "forward_only" => Ok(TransitionPolicy::ForwardOnly),
            other => Err(DomainError::validation(format!(
                "unknown transition policy '{other}'"
            ))),
        }
    }
}

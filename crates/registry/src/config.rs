//! Client configuration, read from the environment.

use thiserror::Error;

use textrace_ledger::service::DEFAULT_GAS_LIMIT;
use textrace_ledger::TxOptions;
use textrace_products::TransitionPolicy;

pub const ENV_CONTRACT_ADDRESS: &str = "TEXTRACE_CONTRACT_ADDRESS";
pub const ENV_CATALOG_URL: &str = "TEXTRACE_CATALOG_URL";
pub const ENV_GAS_LIMIT: &str = "TEXTRACE_GAS_LIMIT";
pub const ENV_TRANSITION_POLICY: &str = "TEXTRACE_TRANSITION_POLICY";

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x21CFF3353F89Df64c848758d86Afb984001c9C01";
pub const DEFAULT_CATALOG_URL: &str =
    "https://api.myjson.online/v1/records/5f3ec479-5b28-47a2-9407-c8cd7abcf706";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be an unsigned integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Address of the deployed product contract.
    pub contract_address: String,
    /// URL of the reference catalog used to pre-fill the issue form.
    pub catalog_url: String,
    pub gas_limit: u64,
    pub transition_policy: TransitionPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT,
            transition_policy: TransitionPolicy::default(),
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let contract_address = lookup(ENV_CONTRACT_ADDRESS).unwrap_or_else(|| {
            tracing::warn!("{ENV_CONTRACT_ADDRESS} not set; using default contract");
            defaults.contract_address
        });

        let catalog_url = lookup(ENV_CATALOG_URL).unwrap_or(defaults.catalog_url);

        let gas_limit = match lookup(ENV_GAS_LIMIT) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: ENV_GAS_LIMIT,
                value: raw,
            })?,
            None => defaults.gas_limit,
        };

        let transition_policy = match lookup(ENV_TRANSITION_POLICY) {
            Some(raw) => raw.parse().map_err(|e: textrace_core::DomainError| ConfigError::Invalid {
                key: ENV_TRANSITION_POLICY,
                reason: e.to_string(),
            })?,
            None => defaults.transition_policy,
        };

        Ok(Self {
            contract_address,
            catalog_url,
            gas_limit,
            transition_policy,
        })
    }

    pub fn tx_options(&self) -> TxOptions {
        TxOptions::with_gas_limit(self.gas_limit)
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use textrace_core::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet provider is available in this environment.
    #[error("no wallet provider detected")]
    NotDetected,

    /// The user (or provider) refused to authorise an account.
    #[error("account request rejected: {0}")]
    Rejected(String),

    /// The provider failed for another reason.
    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Authentication collaborator, typically a browser wallet extension.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// The account already authorised for this application, if any.
    ///
    /// Must not prompt the user.
    async fn current_account(&self) -> Result<Option<AccountId>, WalletError>;

    /// Ask the user to authorise an account.
    async fn request_account(&self) -> Result<AccountId, WalletError>;
}

/// In-process wallet with a fixed account.
///
/// Intended for tests/dev. `authorized` starts as `true` when built with
/// [`StaticWallet::connected`], so `current_account` finds the account
/// without a prompt; `approve` controls whether prompts are accepted.
#[derive(Debug)]
pub struct StaticWallet {
    account: Option<AccountId>,
    authorized: AtomicBool,
    approve: AtomicBool,
    requests: Mutex<u32>,
}

impl StaticWallet {
    /// A wallet holding `account`, not yet authorised for this application.
    pub fn new(account: AccountId) -> Self {
        Self {
            account: Some(account),
            authorized: AtomicBool::new(false),
            approve: AtomicBool::new(true),
            requests: Mutex::new(0),
        }
    }

    /// A wallet whose account was authorised in an earlier visit.
    pub fn connected(account: AccountId) -> Self {
        let wallet = Self::new(account);
        wallet.authorized.store(true, Ordering::SeqCst);
        wallet
    }

    /// No provider installed.
    pub fn absent() -> Self {
        Self {
            account: None,
            authorized: AtomicBool::new(false),
            approve: AtomicBool::new(false),
            requests: Mutex::new(0),
        }
    }

    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    /// Number of `request_account` prompts shown so far.
    pub fn request_count(&self) -> u32 {
        self.requests.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl WalletProvider for StaticWallet {
    async fn current_account(&self) -> Result<Option<AccountId>, WalletError> {
        let Some(account) = &self.account else {
            return Err(WalletError::NotDetected);
        };
        if self.authorized.load(Ordering::SeqCst) {
            Ok(Some(account.clone()))
        } else {
            Ok(None)
        }
    }

    async fn request_account(&self) -> Result<AccountId, WalletError> {
        let Some(account) = &self.account else {
            return Err(WalletError::NotDetected);
        };

        if let Ok(mut n) = self.requests.lock() {
            *n += 1;
        }

        if !self.approve.load(Ordering::SeqCst) {
            tracing::debug!(%account, "wallet prompt declined");
            return Err(WalletError::Rejected("user rejected the request".to_string()));
        }

        self.authorized.store(true, Ordering::SeqCst);
        Ok(account.clone())
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use textrace_core::AccountId;

use crate::{WalletError, WalletProvider};

/// An authenticated binding between an account and the capability to submit
/// mutating operations.
///
/// There is no public constructor: a session exists only after a successful
/// wallet handshake. Dropping it is the disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    account: AccountId,
    connected_at: DateTime<Utc>,
}

impl Session {
    /// Prompt the wallet for an account and open a session for it.
    pub async fn connect<W>(wallet: &W) -> Result<Self, WalletError>
    where
        W: WalletProvider + ?Sized,
    {
        let account = wallet.request_account().await?;
        tracing::info!(%account, "wallet connected");
        Ok(Self::open(account))
    }

    /// Reuse an account the wallet already authorised, without prompting.
    pub async fn restore<W>(wallet: &W) -> Result<Option<Self>, WalletError>
    where
        W: WalletProvider + ?Sized,
    {
        match wallet.current_account().await? {
            Some(account) => {
                tracing::info!(%account, "wallet session restored");
                Ok(Some(Self::open(account)))
            }
            None => Ok(None),
        }
    }

    fn open(account: AccountId) -> Self {
        Self {
            account,
            connected_at: Utc::now(),
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

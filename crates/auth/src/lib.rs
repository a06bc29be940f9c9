//! `textrace-auth`: wallet authentication boundary.
//!
//! A [`Session`] can only be obtained through a [`WalletProvider`] handshake.
//! Holding one is what entitles a caller to submit mutating operations.

pub mod session;
pub mod wallet;

pub use session::Session;
pub use wallet::{StaticWallet, WalletError, WalletProvider};

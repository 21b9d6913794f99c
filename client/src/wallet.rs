//! Wallet providers: the source of the signing identity for writes.
//!
//! Signing itself is delegated to whatever sits behind the provider; the
//! client only needs the connected account.

use async_trait::async_trait;
use ballot_types::Address;

/// An injected wallet, e.g. a browser extension or a keystore daemon.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connected accounts; the first one signs.
    async fn accounts(&self) -> Vec<Address>;
}

/// A wallet with a fixed account, configured up front.
#[derive(Clone, Debug)]
pub struct StaticWallet {
    account: Address,
}

impl StaticWallet {
    pub fn new(account: Address) -> Self {
        Self { account }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn accounts(&self) -> Vec<Address> {
        vec![self.account.clone()]
    }
}

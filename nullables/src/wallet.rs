//! Nullable wallet: a connectable account list.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use ballot_client::WalletProvider;
use ballot_types::Address;

/// A wallet whose connection state a test controls.
#[derive(Debug, Default)]
pub struct NullWallet {
    accounts: Mutex<Vec<Address>>,
}

impl NullWallet {
    pub fn connected(account: Address) -> Self {
        Self {
            accounts: Mutex::new(vec![account]),
        }
    }

    /// Injected, but no account connected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&self, account: Address) {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts.clear();
        accounts.push(account);
    }

    pub fn disconnect(&self) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl WalletProvider for NullWallet {
    async fn accounts(&self) -> Vec<Address> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

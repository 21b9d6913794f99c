//! Produces correctly configured ledger handles.

use std::sync::Arc;

use ballot_ledger::LedgerContract;
use ballot_types::Address;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::handle::{ReadHandle, WriteHandle};
use crate::rpc::RpcLedger;
use crate::wallet::{StaticWallet, WalletProvider};

/// Binds the ledger collaborator to an optional injected wallet.
#[derive(Clone)]
pub struct LedgerConnector {
    ledger: Arc<dyn LedgerContract>,
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl LedgerConnector {
    pub fn new(ledger: Arc<dyn LedgerContract>) -> Self {
        Self { ledger, wallet: None }
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// An RPC-backed connector for `config`, with a static wallet when an
    /// address is configured.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let ledger = RpcLedger::new(&config.rpc_url)?;
        let mut connector = Self::new(Arc::new(ledger));
        if let Some(raw) = &config.wallet_address {
            let account = Address::parse(raw)
                .map_err(|e| ClientError::Config(format!("wallet_address: {e}")))?;
            connector = connector.with_wallet(Arc::new(StaticWallet::new(account)));
        }
        Ok(connector)
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// A read handle. Construction never fails; network errors surface when
    /// the handle is used.
    pub fn read_handle(&self) -> ReadHandle {
        ReadHandle::new(Arc::clone(&self.ledger))
    }

    /// A write handle signed by the wallet's first connected account.
    pub async fn write_handle(&self) -> ClientResult<WriteHandle> {
        let wallet = self.wallet.as_ref().ok_or(ClientError::NoSigner)?;
        let signer = wallet
            .accounts()
            .await
            .into_iter()
            .next()
            .ok_or(ClientError::NoSigner)?;
        Ok(WriteHandle::new(Arc::clone(&self.ledger), signer))
    }

    /// The connected account, if any.
    pub async fn account(&self) -> Option<Address> {
        match &self.wallet {
            Some(wallet) => wallet.accounts().await.into_iter().next(),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_ledger::{LedgerConfig, MemoryLedger};

    #[tokio::test]
    async fn write_handle_requires_a_wallet() {
        let connector = LedgerConnector::new(Arc::new(MemoryLedger::new(LedgerConfig::default())));
        assert!(matches!(
            connector.write_handle().await,
            Err(ClientError::NoSigner)
        ));
        assert_eq!(connector.read_handle().proposal_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn write_handle_signs_as_the_first_account() {
        let account = Address::from_seed(4);
        let connector = LedgerConnector::new(Arc::new(MemoryLedger::new(LedgerConfig::default())))
            .with_wallet(Arc::new(StaticWallet::new(account.clone())));
        let handle = connector.write_handle().await.unwrap();
        assert_eq!(handle.signer(), &account);
    }

    #[test]
    fn bad_configured_wallet_is_a_config_error() {
        let config = ClientConfig {
            wallet_address: Some("not-an-address".into()),
            ..ClientConfig::default()
        };
        assert!(matches!(
            LedgerConnector::from_config(&config),
            Err(ClientError::Config(_))
        ));
    }
}

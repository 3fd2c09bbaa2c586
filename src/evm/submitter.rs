//! Alloy-backed transaction submitter
//!
//! Signs with a local private key and submits over per-chain HTTP
//! providers. Confirmation waits poll for the receipt until it is buried
//! under the configured finality depth, bounded by a timeout.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::SubmitterError;
use crate::gateway::CallRequest;
use crate::registry::ChainRegistry;
use crate::submitter::{SubmitterCapabilities, TransactionSubmitter, TxReceipt};
use crate::types::TxHash;

/// Finality and polling behavior for confirmation waits
#[derive(Debug, Clone)]
pub struct EvmSubmitterConfig {
    /// Confirmations required before a transaction counts as final
    pub finality_blocks: u64,
    /// Receipt poll interval
    pub poll_interval: Duration,
    /// Hard ceiling on one confirmation wait
    pub confirmation_timeout: Duration,
}

impl Default for EvmSubmitterConfig {
    fn default() -> Self {
        Self {
            finality_blocks: 1,
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(180),
        }
    }
}

/// Submitter signing with a local key over per-chain HTTP RPC endpoints.
///
/// Submissions are serialized per chain so concurrent transfers from the
/// same account cannot race on nonces.
pub struct EvmSubmitter {
    endpoints: HashMap<u64, String>,
    signer: PrivateKeySigner,
    config: EvmSubmitterConfig,
    submit_locks: HashMap<u64, Mutex<()>>,
}

impl EvmSubmitter {
    /// Create a submitter for every chain in the registry
    pub fn new(
        registry: &ChainRegistry,
        private_key: &str,
        config: EvmSubmitterConfig,
    ) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| eyre!("Invalid private key: {}", e))?;

        let endpoints: HashMap<u64, String> = registry
            .chains()
            .iter()
            .map(|c| (c.chain_id, c.rpc_url.clone()))
            .collect();
        let submit_locks = endpoints.keys().map(|&id| (id, Mutex::new(()))).collect();

        info!(
            signer_address = %signer.address(),
            chains = endpoints.len(),
            "EVM submitter initialized"
        );

        Ok(Self {
            endpoints,
            signer,
            config,
            submit_locks,
        })
    }

    /// The signing account's address
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    fn endpoint(&self, chain_id: u64) -> Result<&str, SubmitterError> {
        self.endpoints
            .get(&chain_id)
            .map(|s| s.as_str())
            .ok_or_else(|| SubmitterError::Rpc(format!("no RPC endpoint for chain {chain_id}")))
    }

    fn parse_url(url: &str) -> Result<reqwest::Url, SubmitterError> {
        url.parse()
            .map_err(|e| SubmitterError::Rpc(format!("invalid RPC URL: {e}")))
    }
}

#[async_trait]
impl TransactionSubmitter for EvmSubmitter {
    async fn submit(&self, chain_id: u64, call: &CallRequest) -> Result<TxHash, SubmitterError> {
        let url = Self::parse_url(self.endpoint(chain_id)?)?;

        // One in-flight submission per chain: sequential nonces
        let _guard = match self.submit_locks.get(&chain_id) {
            Some(lock) => lock.lock().await,
            None => return Err(SubmitterError::Rpc(format!("no lock for chain {chain_id}"))),
        };

        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new().wallet(wallet).on_http(url);

        let tx = TransactionRequest::default()
            .with_to(call.to)
            .with_input(call.data.clone())
            .with_value(call.value);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| SubmitterError::Rejected(e.to_string()))?;
        let tx_hash = *pending.tx_hash();

        debug!(chain_id, tx_hash = %tx_hash, to = %call.to, "Transaction submitted");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(
        &self,
        chain_id: u64,
        tx_hash: TxHash,
    ) -> Result<TxReceipt, SubmitterError> {
        let url = Self::parse_url(self.endpoint(chain_id)?)?;
        let provider = ProviderBuilder::new().on_http(url);

        let started = tokio::time::Instant::now();
        loop {
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| SubmitterError::Rpc(e.to_string()))?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(SubmitterError::Reverted(tx_hash));
                }
                if let Some(block_number) = receipt.block_number {
                    let current = provider
                        .get_block_number()
                        .await
                        .map_err(|e| SubmitterError::Rpc(e.to_string()))?;
                    let confirmations = current.saturating_sub(block_number) + 1;
                    if confirmations >= self.config.finality_blocks {
                        debug!(chain_id, tx_hash = %tx_hash, block_number, "Transaction confirmed");
                        return Ok(TxReceipt {
                            tx_hash,
                            block_number,
                        });
                    }
                }
            }

            if started.elapsed() >= self.config.confirmation_timeout {
                return Err(SubmitterError::ConfirmationTimeout(tx_hash));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    fn capabilities(&self) -> SubmitterCapabilities {
        // fees come out of the signing account; no paymaster in this path
        SubmitterCapabilities {
            supports_sponsorship: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_new_builds_endpoint_per_chain() {
        let registry = ChainRegistry::sepolia_testnets("key");
        let submitter =
            EvmSubmitter::new(&registry, TEST_KEY, EvmSubmitterConfig::default()).unwrap();

        assert_eq!(submitter.endpoints.len(), registry.chains().len());
        assert!(submitter.endpoint(11155111).is_ok());
        assert!(matches!(
            submitter.endpoint(424242),
            Err(SubmitterError::Rpc(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_key() {
        let registry = ChainRegistry::sepolia_testnets("key");
        assert!(EvmSubmitter::new(&registry, "not-a-key", EvmSubmitterConfig::default()).is_err());
    }

    #[test]
    fn test_no_sponsorship_capability() {
        let registry = ChainRegistry::sepolia_testnets("key");
        let submitter =
            EvmSubmitter::new(&registry, TEST_KEY, EvmSubmitterConfig::default()).unwrap();
        assert!(!submitter.capabilities().supports_sponsorship);
    }
}

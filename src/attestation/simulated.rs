//! Simulated attestation service
//!
//! Stands in for the real attestation API in tests and local demos: after a
//! fixed delay it reports every transfer as attested, deriving the transfer
//! id from the initiation hash. There is no proof — the destination
//! contract in a local deployment must not verify one.
//!
//! This is a development tool. It lives behind the same trait as the HTTP
//! client and is only active when explicitly injected; never wire it into a
//! production orchestrator.

use alloy::primitives::{keccak256, Bytes};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::AttestationError;
use crate::types::{TransferId, TxHash};

use super::{Attestation, AttestationService};

/// Always-attesting stand-in for the attestation API
#[derive(Debug, Clone)]
pub struct SimulatedAttestationService {
    delay: Duration,
}

impl SimulatedAttestationService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAttestationService {
    fn default() -> Self {
        // roughly what a fast testnet attestation takes
        Self::new(Duration::from_secs(3))
    }
}

#[async_trait]
impl AttestationService for SimulatedAttestationService {
    async fn fetch_attestation(
        &self,
        source_chain_id: u64,
        initiation_tx: TxHash,
    ) -> Result<Option<Attestation>, AttestationError> {
        tokio::time::sleep(self.delay).await;

        let transfer_id = TransferId(keccak256(initiation_tx));
        debug!(
            source_chain_id,
            initiation_tx = %initiation_tx,
            transfer_id = %transfer_id,
            "Simulated attestation"
        );

        Ok(Some(Attestation {
            transfer_id,
            proof: Bytes::new(),
        }))
    }
}

//! Attestation service capability and poll loop
//!
//! After the source-chain initiation is confirmed, the bridging protocol's
//! off-chain attestation service must observe the deposit before the
//! destination chain will mint. The orchestrator polls an injected
//! [`AttestationService`] with exponential backoff under a hard deadline;
//! the wait is cancellable and a deadline miss is reported distinctly so an
//! operator can drive recovery (funds are escrowed, not lost).

pub mod http;
pub mod simulated;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::AttestationError;
use crate::types::{TransferId, TxHash};

pub use http::HttpAttestationService;
pub use simulated::SimulatedAttestationService;

/// Signed proof that a source-chain deposit/burn occurred, required by the
/// destination minter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Protocol-assigned transfer id
    pub transfer_id: TransferId,
    /// Opaque attestation proof bytes
    pub proof: Bytes,
}

/// Source of attestations for initiated transfers.
#[async_trait]
pub trait AttestationService: Send + Sync {
    /// Look up the attestation for an initiation transaction. `Ok(None)`
    /// means not yet available — the caller keeps polling.
    async fn fetch_attestation(
        &self,
        source_chain_id: u64,
        initiation_tx: TxHash,
    ) -> Result<Option<Attestation>, AttestationError>;
}

/// Backoff and deadline for the attestation poll
#[derive(Debug, Clone)]
pub struct AttestationPollConfig {
    /// Initial backoff between polls
    pub initial_backoff: Duration,
    /// Maximum backoff between polls
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth
    pub backoff_multiplier: f64,
    /// Hard ceiling on the total wait
    pub timeout: Duration,
}

impl Default for AttestationPollConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            timeout: Duration::from_secs(600),
        }
    }
}

impl AttestationPollConfig {
    /// Calculate backoff duration for a given attempt (0-indexed)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}

/// Outcome of one bounded attestation wait
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Attestation arrived
    Attested(Attestation),
    /// The deadline passed without an attestation
    TimedOut { waited: Duration },
    /// The caller cancelled the wait
    Cancelled,
}

/// Resolves once a cancel signal arrives. A dropped sender is treated as
/// "no cancellation possible", not as a cancel.
pub(crate) async fn cancel_signalled(cancel: &mut mpsc::Receiver<()>) {
    if cancel.recv().await.is_none() {
        std::future::pending::<()>().await;
    }
}

/// Poll `service` until an attestation arrives, the configured deadline
/// passes, or the caller cancels.
///
/// Fetch errors are logged and retried until the deadline; the service
/// being briefly unreachable must not fail a transfer whose funds are
/// already escrowed.
pub async fn poll_attestation(
    service: &dyn AttestationService,
    source_chain_id: u64,
    initiation_tx: TxHash,
    config: &AttestationPollConfig,
    cancel: &mut mpsc::Receiver<()>,
) -> PollOutcome {
    let started = tokio::time::Instant::now();
    let deadline = started + config.timeout;
    let mut attempt: u32 = 0;

    loop {
        match service.fetch_attestation(source_chain_id, initiation_tx).await {
            Ok(Some(attestation)) => {
                debug!(
                    transfer_id = %attestation.transfer_id,
                    attempts = attempt + 1,
                    "Attestation received"
                );
                return PollOutcome::Attested(attestation);
            }
            Ok(None) => {
                debug!(attempt, initiation_tx = %initiation_tx, "Attestation not yet available");
            }
            Err(e) => {
                warn!(error = %e, attempt, "Attestation fetch failed, will retry");
            }
        }

        let backoff = config.backoff_for_attempt(attempt);
        attempt += 1;
        let next_poll = tokio::time::Instant::now() + backoff;

        if next_poll >= deadline {
            // Deadline lands before the next poll: wait out the remainder, then give up
            tokio::select! {
                _ = cancel_signalled(cancel) => return PollOutcome::Cancelled,
                _ = tokio::time::sleep_until(deadline) => {
                    return PollOutcome::TimedOut { waited: started.elapsed() };
                }
            }
        }

        tokio::select! {
            _ = cancel_signalled(cancel) => return PollOutcome::Cancelled,
            _ = tokio::time::sleep_until(next_poll) => {}
        }
    }
}

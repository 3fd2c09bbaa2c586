//! Transaction submitter capability
//!
//! The orchestrator never talks to a chain directly; it hands encoded
//! `CallRequest`s to an injected submitter. Production uses the alloy-backed
//! [`crate::evm::EvmSubmitter`]; tests use in-memory mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SubmitterError;
use crate::gateway::CallRequest;
use crate::types::TxHash;

/// Receipt of a confirmed (finalized) transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// What the submitter can do beyond plain submission.
///
/// An explicit capability record, provided by the collaborator, instead of
/// probing client objects at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterCapabilities {
    /// Whether transaction fees can be paid by a paymaster instead of the
    /// sending account
    pub supports_sponsorship: bool,
}

/// Capability to submit calls on a chain and await their confirmation.
///
/// Implementations own signing, fee handling, and nonce sequencing; callers
/// must still await `wait_for_confirmation` before issuing a dependent call
/// on the same account.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit a call on the given chain, returning the transaction hash.
    /// A returned hash means accepted by the network, not yet confirmed.
    async fn submit(&self, chain_id: u64, call: &CallRequest) -> Result<TxHash, SubmitterError>;

    /// Wait until the transaction is confirmed at the implementation's
    /// finality depth. Fails with `Reverted` if the transaction was mined
    /// but failed, or `ConfirmationTimeout` if no receipt arrives in time.
    async fn wait_for_confirmation(
        &self,
        chain_id: u64,
        tx_hash: TxHash,
    ) -> Result<TxReceipt, SubmitterError>;

    /// Static capabilities of this submitter
    fn capabilities(&self) -> SubmitterCapabilities {
        SubmitterCapabilities::default()
    }
}

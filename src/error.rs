//! Error taxonomy for cross-chain transfers
//!
//! Every failure mode is a tagged variant so callers branch on kind instead
//! of matching error-message substrings. All error types are serializable so
//! they survive inside a persisted `TransferStatus`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{TransferStep, TxHash};

/// Malformed input to a gateway call encoder.
///
/// These indicate a programming error upstream (an unchecked address or
/// amount reaching the encoding layer) and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EncodingError {
    /// An address argument was the zero address
    #[error("zero address for {0}")]
    ZeroAddress(String),

    /// The amount string did not parse, was non-positive, or overflowed
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Failure reported by a transaction submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SubmitterError {
    /// The signer refused or failed to submit the call (user rejection,
    /// insufficient gas, malformed transaction)
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// RPC/transport failure while talking to the chain
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The transaction was mined but reverted on-chain. Distinct from
    /// `Rejected`: state may have changed (gas was spent, nonce consumed).
    #[error("transaction {0} reverted on-chain")]
    Reverted(TxHash),

    /// No receipt reached the configured finality depth within the bound
    #[error("timed out waiting for confirmation of {0}")]
    ConfirmationTimeout(TxHash),
}

/// Failure reported by an attestation service lookup.
///
/// A lookup that succeeds but finds no attestation yet is `Ok(None)`, not an
/// error; the poll loop treats fetch errors as retryable until its deadline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AttestationError {
    #[error("attestation service error: {0}")]
    Service(String),

    #[error("malformed attestation response: {0}")]
    Malformed(String),
}

/// Terminal error of a cross-chain transfer, recorded on the
/// `TransferStatus` together with the phase at which it occurred.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum TransferError {
    /// Entry-precondition violation: unknown chain, not bridge-ready, same
    /// source and destination, zero recipient, bad amount. Surfaced before
    /// any call is issued.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A call encoder rejected its inputs
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The submitter failed to get the step's transaction on-chain
    #[error("{step} submission failed: {message}")]
    Submission {
        step: TransferStep,
        message: String,
    },

    /// The step's transaction was mined but reverted
    #[error("{step} transaction {tx_hash} reverted on-chain")]
    TransactionReverted { step: TransferStep, tx_hash: TxHash },

    /// The step's transaction never reached finality within the bound
    #[error("{step} transaction {tx_hash} not confirmed in time")]
    ConfirmationTimeout { step: TransferStep, tx_hash: TxHash },

    /// The bridging attestation did not arrive before the deadline. Funds
    /// are deposited in the source escrow but not yet minted; an operator
    /// can later drive just the completion step via `resume_completion`.
    #[error("attestation not received within {waited_secs}s")]
    AttestationTimeout { waited_secs: u64 },
}

impl TransferError {
    /// Classify a submitter failure for a given step.
    pub fn from_submitter(step: TransferStep, error: SubmitterError) -> Self {
        match error {
            SubmitterError::Rejected(message) | SubmitterError::Rpc(message) => {
                TransferError::Submission { step, message }
            }
            SubmitterError::Reverted(tx_hash) => {
                TransferError::TransactionReverted { step, tx_hash }
            }
            SubmitterError::ConfirmationTimeout(tx_hash) => {
                TransferError::ConfirmationTimeout { step, tx_hash }
            }
        }
    }
}

//! Common types for cross-chain gateway transfers
//!
//! Shared between the registry, gateway bindings, orchestrator, and the
//! operator binary.

use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransferError;

/// Transaction hash (32 bytes)
pub type TxHash = B256;

// ============================================================================
// Bridge Domain
// ============================================================================

/// Bridging-protocol domain identifier for a chain.
///
/// Distinct from the chain's own chain id: e.g. Ethereum Sepolia is chain
/// 11155111 but domain 0, Base Sepolia is chain 84532 but domain 6. The
/// gateway contracts speak domains, everything else speaks chain ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BridgeDomain(pub u32);

impl BridgeDomain {
    pub fn from_u32(domain: u32) -> Self {
        BridgeDomain(domain)
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BridgeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BridgeDomain {
    fn from(domain: u32) -> Self {
        BridgeDomain(domain)
    }
}

// ============================================================================
// Transfer Id
// ============================================================================

/// Unique identifier for a cross-chain transfer, assigned by the gateway
/// protocol when the transfer is initiated and carried in the attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub B256);

impl TransferId {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Create from hex string (with or without 0x prefix)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != 32 {
            return Err(eyre!("TransferId must be 32 bytes, got {}", bytes.len()));
        }
        Ok(TransferId(B256::from_slice(&bytes)))
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<B256> for TransferId {
    fn from(bytes: B256) -> Self {
        TransferId(bytes)
    }
}

// ============================================================================
// Token Roles
// ============================================================================

/// Logical role of a well-known token on a chain.
///
/// Not every chain carries every role; lookups return `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenRole {
    /// Circle USD Coin (USDC)
    #[serde(rename = "usdc")]
    Usdc,
    /// Local-currency stablecoin (COPe, Electronic Colombian Peso)
    #[serde(rename = "local_stablecoin")]
    LocalStablecoin,
    /// Euro stablecoin (EURC)
    #[serde(rename = "eur_stablecoin")]
    EurStablecoin,
}

impl TokenRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRole::Usdc => "usdc",
            TokenRole::LocalStablecoin => "local_stablecoin",
            TokenRole::EurStablecoin => "eur_stablecoin",
        }
    }
}

impl fmt::Display for TokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Transfer Request
// ============================================================================

/// Parameters for one cross-chain transfer, as collected from the caller.
///
/// The amount is a human-readable decimal string ("10.5"); it is converted
/// to token base units using the per-chain token decimals at encoding time.
/// Balance sufficiency is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source_chain_id: u64,
    pub destination_chain_id: u64,
    pub amount: String,
    pub recipient: alloy::primitives::Address,
}

// ============================================================================
// Transfer State
// ============================================================================

/// Phase of a cross-chain transfer.
///
/// Transitions are strictly forward:
/// `Idle -> Approving -> Depositing -> AwaitingCompletion -> Completed`,
/// with `Failed` reachable from any non-terminal phase and `Abandoned`
/// entered when the caller cancels mid-flight. `Completed`, `Failed`, and
/// `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPhase {
    Idle,
    Approving,
    Depositing,
    AwaitingCompletion,
    Completed,
    Failed,
    Abandoned,
}

impl TransferPhase {
    /// Get the phase as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPhase::Idle => "idle",
            TransferPhase::Approving => "approving",
            TransferPhase::Depositing => "depositing",
            TransferPhase::AwaitingCompletion => "awaiting_completion",
            TransferPhase::Completed => "completed",
            TransferPhase::Failed => "failed",
            TransferPhase::Abandoned => "abandoned",
        }
    }

    /// Whether this phase ends the transfer
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferPhase::Completed | TransferPhase::Failed | TransferPhase::Abandoned
        )
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One on-chain step of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStep {
    /// ERC-20 allowance for the escrow contract
    Approve,
    /// Deposit into the source-chain escrow
    Deposit,
    /// Request the cross-chain transfer on the source chain
    Initiate,
    /// Mint on the destination chain once attested
    Complete,
}

impl TransferStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStep::Approve => "approve",
            TransferStep::Deposit => "deposit",
            TransferStep::Initiate => "initiate",
            TransferStep::Complete => "complete",
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A confirmed on-chain transaction belonging to a transfer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransaction {
    pub step: TransferStep,
    pub chain_id: u64,
    pub tx_hash: TxHash,
}

/// The error that ended a transfer, frozen at the phase where it occurred.
///
/// `phase` is the phase the transfer was in when the failure happened, not
/// the terminal `Failed` phase; callers use it to decide on manual
/// remediation (e.g. deposited but never minted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub phase: TransferPhase,
    pub error: TransferError,
}

/// Mutable state of one in-flight transfer, owned by a single orchestrator
/// run for its lifetime.
///
/// Fully serializable: a host that wants durability across restarts can
/// persist the status externally and feed the recorded initiation hash back
/// into `CrossChainOrchestrator::resume_completion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStatus {
    pub request: TransferRequest,
    /// Current phase
    pub phase: TransferPhase,
    /// Every phase entered, in order, starting with `Idle`
    pub phase_history: Vec<TransferPhase>,
    /// Confirmed transactions in step order
    pub transactions: Vec<StepTransaction>,
    /// Present only when `phase == Failed`
    pub error: Option<ErrorDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferStatus {
    /// Create a fresh status in the `Idle` phase
    pub fn new(request: TransferRequest) -> Self {
        let now = Utc::now();
        Self {
            request,
            phase: TransferPhase::Idle,
            phase_history: vec![TransferPhase::Idle],
            transactions: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ordered hashes of all confirmed step transactions
    pub fn tx_hashes(&self) -> Vec<TxHash> {
        self.transactions.iter().map(|t| t.tx_hash).collect()
    }

    /// Whether the transfer has reached a terminal phase
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub(crate) fn advance(&mut self, phase: TransferPhase) {
        self.phase = phase;
        self.phase_history.push(phase);
        self.updated_at = Utc::now();
    }

    pub(crate) fn record_transaction(&mut self, step: TransferStep, chain_id: u64, tx_hash: TxHash) {
        self.transactions.push(StepTransaction {
            step,
            chain_id,
            tx_hash,
        });
        self.updated_at = Utc::now();
    }

    pub(crate) fn fail(&mut self, error: TransferError) {
        let at = self.phase;
        self.error = Some(ErrorDetail { phase: at, error });
        self.advance(TransferPhase::Failed);
    }

    pub(crate) fn abandon(&mut self) {
        self.advance(TransferPhase::Abandoned);
    }
}

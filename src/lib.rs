//! Gateway Transfer: cross-chain USDC transfer orchestration
//!
//! This crate implements the core of a cross-chain USDC transfer over
//! Gateway escrow/minter contracts:
//!
//! - **Registry** - Static table of supported chains with RPC endpoints and
//!   well-known token contracts (USDC, COPe, EURC)
//! - **Gateway** - Per-chain deployment records and pure ABI call encoding
//!   for approve/deposit/initiate/complete
//! - **Orchestrator** - The per-transfer state machine driving
//!   `approve -> deposit -> initiate -> (attestation) -> complete` across
//!   two chains
//! - **Submitter** - Transaction submission capability trait, with an
//!   alloy-backed production implementation in `evm`
//! - **Attestation** - Attestation service trait with HTTP and simulated
//!   implementations, and the bounded cancellable poll loop
//!
//! The orchestrator performs no network I/O of its own: it encodes calls
//! and hands them to the injected submitter, so the whole state machine is
//! testable against in-memory mocks.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! gateway-transfer = { path = "../gateway-transfer" }
//! ```

pub mod attestation;
pub mod config;
pub mod error;
pub mod evm;
pub mod gateway;
pub mod orchestrator;
pub mod registry;
pub mod submitter;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{AttestationError, EncodingError, SubmitterError, TransferError};
pub use gateway::{CallRequest, GatewayDeployment, GatewayDeployments};
pub use orchestrator::{CrossChainOrchestrator, OrchestratorConfig, TransferHandle};
pub use registry::{ChainConfig, ChainRegistry, TokenInfo};
pub use submitter::{SubmitterCapabilities, TransactionSubmitter, TxReceipt};
pub use types::{
    BridgeDomain, TokenRole, TransferId, TransferPhase, TransferRequest, TransferStatus,
    TransferStep, TxHash,
};

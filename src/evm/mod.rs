//! EVM transaction submission
//!
//! Production implementation of the submitter capability on top of alloy
//! HTTP providers with a local private-key signer.

pub mod submitter;

pub use submitter::{EvmSubmitter, EvmSubmitterConfig};

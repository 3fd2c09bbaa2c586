//! Gateway contract layer
//!
//! Per-chain gateway deployment records plus the pure ABI encoding needed to
//! drive a cross-chain transfer: `approve`, `deposit`,
//! `initiateCrossChainTransfer`, `completeCrossChainTransfer`. No network
//! I/O happens here; encoders produce `CallRequest` values for a
//! transaction submitter to execute.

pub mod amount;
pub mod contracts;
pub mod deployments;
pub mod encode;

pub use amount::{format_base_units, parse_base_units};
pub use deployments::{GatewayDeployment, GatewayDeployments};
pub use encode::{
    encode_approve, encode_complete_transfer, encode_deposit, encode_initiate_transfer,
    CallRequest,
};

//! Call encoding for gateway operations
//!
//! Pure functions translating a logical operation into a `CallRequest` the
//! transaction submitter can execute. Amounts arrive as decimal strings and
//! are converted to base units with the token's decimals here; every
//! encoder rejects zero addresses and non-positive amounts.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::gateway::amount::parse_base_units;
use crate::gateway::contracts::{GatewayMinter, GatewayWallet, ERC20};
use crate::types::{BridgeDomain, TransferId};

/// A chain call ready for submission: target address, ABI-encoded calldata,
/// and native value to attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl CallRequest {
    fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }
}

/// ERC-20 `approve` granting `spender` an allowance of exactly `amount`,
/// never unlimited.
pub fn encode_approve(
    token: Address,
    spender: Address,
    amount: &str,
    decimals: u8,
) -> Result<CallRequest, EncodingError> {
    ensure_non_zero(token, "token")?;
    ensure_non_zero(spender, "spender")?;
    let units = positive_units(amount, decimals)?;

    let call = ERC20::approveCall {
        spender,
        amount: units,
    };
    Ok(CallRequest::new(token, call.abi_encode()))
}

/// `deposit` on the escrow wallet contract.
pub fn encode_deposit(
    wallet: Address,
    token: Address,
    amount: &str,
    decimals: u8,
) -> Result<CallRequest, EncodingError> {
    ensure_non_zero(wallet, "wallet")?;
    ensure_non_zero(token, "token")?;
    let units = positive_units(amount, decimals)?;

    let call = GatewayWallet::depositCall {
        token,
        amount: units,
    };
    Ok(CallRequest::new(wallet, call.abi_encode()))
}

/// `initiateCrossChainTransfer` on the source chain's escrow wallet.
pub fn encode_initiate_transfer(
    wallet: Address,
    token: Address,
    destination_domain: BridgeDomain,
    recipient: Address,
    amount: &str,
    decimals: u8,
) -> Result<CallRequest, EncodingError> {
    ensure_non_zero(wallet, "wallet")?;
    ensure_non_zero(token, "token")?;
    ensure_non_zero(recipient, "recipient")?;
    let units = positive_units(amount, decimals)?;

    let call = GatewayWallet::initiateCrossChainTransferCall {
        token,
        destinationDomain: destination_domain.to_u32(),
        destinationRecipient: recipient,
        amount: units,
    };
    Ok(CallRequest::new(wallet, call.abi_encode()))
}

/// `completeCrossChainTransfer` on the destination chain's minter.
///
/// `decimals` are the destination chain's token decimals, which may differ
/// from the source chain's.
#[allow(clippy::too_many_arguments)]
pub fn encode_complete_transfer(
    minter: Address,
    token: Address,
    recipient: Address,
    amount: &str,
    decimals: u8,
    transfer_id: TransferId,
    source_domain: BridgeDomain,
) -> Result<CallRequest, EncodingError> {
    ensure_non_zero(minter, "minter")?;
    ensure_non_zero(token, "token")?;
    ensure_non_zero(recipient, "recipient")?;
    let units = positive_units(amount, decimals)?;

    let call = GatewayMinter::completeCrossChainTransferCall {
        token,
        recipient,
        amount: units,
        transferId: transfer_id.0,
        sourceDomain: source_domain.to_u32(),
    };
    Ok(CallRequest::new(minter, call.abi_encode()))
}

fn ensure_non_zero(address: Address, field: &str) -> Result<(), EncodingError> {
    if address == Address::ZERO {
        return Err(EncodingError::ZeroAddress(field.to_string()));
    }
    Ok(())
}

fn positive_units(amount: &str, decimals: u8) -> Result<U256, EncodingError> {
    let units = parse_base_units(amount, decimals)?;
    if units.is_zero() {
        return Err(EncodingError::InvalidAmount(format!(
            "amount '{amount}' is not positive at {decimals} decimals"
        )));
    }
    Ok(units)
}

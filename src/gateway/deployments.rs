//! Gateway deployment records
//!
//! Per-chain addresses of the gateway contracts and the chain's bridging
//! domain. A chain is "bridge-ready" only once both the escrow wallet and
//! the minter are deployed; the orchestrator refuses transfers touching a
//! chain that is not.
//!
//! Like the chain registry this is an injected value: tests substitute fake
//! deployments without touching any global state.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::BridgeDomain;

/// Gateway contract addresses for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayDeployment {
    pub chain_id: u64,
    /// USDC token the gateway escrows and mints
    pub usdc: Address,
    /// Bridging-protocol domain id (distinct from the chain id)
    pub domain: BridgeDomain,
    /// Escrow wallet contract, if deployed
    pub wallet: Option<Address>,
    /// Minter contract, if deployed
    pub minter: Option<Address>,
}

impl GatewayDeployment {
    /// Whether transfers may touch this chain: both the escrow wallet and
    /// the minter must be present and non-zero.
    pub fn is_bridge_ready(&self) -> bool {
        let non_zero = |a: &Option<Address>| a.map(|a| a != Address::ZERO).unwrap_or(false);
        non_zero(&self.wallet) && non_zero(&self.minter)
    }
}

/// Deployment records keyed by chain id
#[derive(Debug, Clone, Default)]
pub struct GatewayDeployments {
    by_chain: HashMap<u64, GatewayDeployment>,
}

impl GatewayDeployments {
    pub fn new(deployments: impl IntoIterator<Item = GatewayDeployment>) -> Self {
        Self {
            by_chain: deployments.into_iter().map(|d| (d.chain_id, d)).collect(),
        }
    }

    /// Look up the deployment for a chain
    pub fn get(&self, chain_id: u64) -> Option<&GatewayDeployment> {
        self.by_chain.get(&chain_id)
    }

    /// The current testnet deployments plus the mainnet USDC/domain entries
    /// (mainnet gateway contracts are not deployed, so those chains are not
    /// bridge-ready).
    pub fn sepolia_testnets() -> Self {
        Self::new([
            // Ethereum Sepolia
            GatewayDeployment {
                chain_id: 11155111,
                usdc: address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238"),
                domain: BridgeDomain(0),
                wallet: Some(address!("2f818d40e3cfa55518f39ea00c7da3ff092d67ca")),
                minter: Some(address!("3b4b237f084b6d0c91e85e678e58fb9658509f85")),
            },
            // Base Sepolia
            GatewayDeployment {
                chain_id: 84532,
                usdc: address!("036cbd53842c5426634e7929541ec2318f3dcf7e"),
                domain: BridgeDomain(6),
                wallet: Some(address!("4cd01f1897bc0ad77cb0cf132436a4c8d5381629")),
                minter: Some(address!("bb288da6959cae1e2803547086a2f35cac9fbf88")),
            },
            // Optimism Sepolia
            GatewayDeployment {
                chain_id: 11155420,
                usdc: address!("5fd84259d66cd46123540766be93dfe6d43130d7"),
                domain: BridgeDomain(2),
                wallet: Some(address!("355e66a0e12ef7578d971e8f2cc8a10a68646cbe")),
                minter: Some(address!("44188c2fff512b30d11878a73a63830a475c20bc")),
            },
            // Ethereum Mainnet
            GatewayDeployment {
                chain_id: 1,
                usdc: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
                domain: BridgeDomain(0),
                wallet: None,
                minter: None,
            },
            // Base Mainnet
            GatewayDeployment {
                chain_id: 8453,
                usdc: address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913"),
                domain: BridgeDomain(6),
                wallet: None,
                minter: None,
            },
            // Optimism Mainnet
            GatewayDeployment {
                chain_id: 10,
                usdc: address!("0b2c639c533813f4aa9d7837caf62653d097ff85"),
                domain: BridgeDomain(2),
                wallet: None,
                minter: None,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testnets_are_bridge_ready() {
        let deployments = GatewayDeployments::sepolia_testnets();
        for chain_id in [11155111u64, 84532, 11155420] {
            assert!(
                deployments.get(chain_id).unwrap().is_bridge_ready(),
                "chain {} should be bridge-ready",
                chain_id
            );
        }
    }

    #[test]
    fn test_mainnets_are_not_bridge_ready() {
        let deployments = GatewayDeployments::sepolia_testnets();
        for chain_id in [1u64, 8453, 10] {
            assert!(!deployments.get(chain_id).unwrap().is_bridge_ready());
        }
    }

    #[test]
    fn test_zero_address_is_not_ready() {
        let deployment = GatewayDeployment {
            chain_id: 31337,
            usdc: Address::with_last_byte(1),
            domain: BridgeDomain(9),
            wallet: Some(Address::ZERO),
            minter: Some(Address::with_last_byte(2)),
        };
        assert!(!deployment.is_bridge_ready());
    }

    #[test]
    fn test_unknown_chain() {
        let deployments = GatewayDeployments::sepolia_testnets();
        assert!(deployments.get(424242).is_none());
    }

    #[test]
    fn test_domains_differ_from_chain_ids() {
        let deployments = GatewayDeployments::sepolia_testnets();
        assert_eq!(deployments.get(11155111).unwrap().domain, BridgeDomain(0));
        assert_eq!(deployments.get(84532).unwrap().domain, BridgeDomain(6));
        assert_eq!(deployments.get(11155420).unwrap().domain, BridgeDomain(2));
    }
}

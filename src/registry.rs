//! Chain Registry
//!
//! Static lookup table of supported chains: native currency, RPC and
//! explorer endpoints, and the well-known token contracts per chain. Pure
//! retrieval, no behavior; everything else resolves addresses and decimals
//! through this table.
//!
//! The registry is an injected value, never a global: tests and alternate
//! environments construct their own.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::types::{TokenRole, TxHash};

/// Native asset metadata for a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A well-known token contract on one chain.
///
/// Decimals are fixed per chain+token pair and must be used for all amount
/// encoding on that chain; the same token can carry different decimals on
/// different chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Token contracts known on a chain, by role. Absence is expected and
/// meaningful (e.g. EURC is not deployed everywhere).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTokens {
    pub usdc: Option<TokenInfo>,
    pub local_stablecoin: Option<TokenInfo>,
    pub eur_stablecoin: Option<TokenInfo>,
}

impl ChainTokens {
    /// Look up a token by role
    pub fn get(&self, role: TokenRole) -> Option<&TokenInfo> {
        match role {
            TokenRole::Usdc => self.usdc.as_ref(),
            TokenRole::LocalStablecoin => self.local_stablecoin.as_ref(),
            TokenRole::EurStablecoin => self.eur_stablecoin.as_ref(),
        }
    }

    /// All tokens present on the chain, in stable role order
    pub fn iter(&self) -> impl Iterator<Item = (TokenRole, &TokenInfo)> {
        [
            (TokenRole::Usdc, self.usdc.as_ref()),
            (TokenRole::LocalStablecoin, self.local_stablecoin.as_ref()),
            (TokenRole::EurStablecoin, self.eur_stablecoin.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, token)| token.map(|t| (role, t)))
    }
}

/// Full configuration for one supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub short_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_url: String,
    pub block_explorer_url: String,
    pub tokens: ChainTokens,
    pub is_default: bool,
}

impl ChainConfig {
    /// Block-explorer link for a transaction
    pub fn explorer_tx_url(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{}", self.block_explorer_url, tx_hash)
    }
}

/// Registry of supported chains, in declaration order.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainConfig>,
}

impl ChainRegistry {
    /// Build a registry from chain configurations. Chain ids must be unique.
    pub fn new(chains: Vec<ChainConfig>) -> Self {
        debug_assert!(
            {
                let mut ids: Vec<u64> = chains.iter().map(|c| c.chain_id).collect();
                ids.sort_unstable();
                ids.windows(2).all(|w| w[0] != w[1])
            },
            "duplicate chain id in registry"
        );
        Self { chains }
    }

    /// Look up a chain by id. Absence is a caller-visible condition.
    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// All chains in declaration order (stable for UI and tests)
    pub fn chains(&self) -> &[ChainConfig] {
        &self.chains
    }

    /// Look up a token by chain and role
    pub fn get_token(&self, chain_id: u64, role: TokenRole) -> Option<&TokenInfo> {
        self.get_chain(chain_id).and_then(|c| c.tokens.get(role))
    }

    /// Tokens present on a chain, in stable role order
    pub fn chain_tokens(&self, chain_id: u64) -> Vec<&TokenInfo> {
        self.get_chain(chain_id)
            .map(|c| c.tokens.iter().map(|(_, t)| t).collect())
            .unwrap_or_default()
    }

    /// The default chain (first flagged, else first declared)
    pub fn default_chain(&self) -> Option<&ChainConfig> {
        self.chains
            .iter()
            .find(|c| c.is_default)
            .or_else(|| self.chains.first())
    }

    /// The Sepolia testnet set the gateway contracts are deployed against.
    ///
    /// RPC endpoints are Alchemy URLs parameterized by API key, matching the
    /// production deployment.
    pub fn sepolia_testnets(alchemy_api_key: &str) -> Self {
        let eth = |name: &str| NativeCurrency {
            name: name.to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        };
        let usdc = |addr: Address| TokenInfo {
            address: addr,
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
        };
        let cope = |addr: Address| TokenInfo {
            address: addr,
            symbol: "COPe".to_string(),
            name: "Electronic Colombian Peso".to_string(),
            decimals: 18,
        };
        let eurc = |addr: Address| TokenInfo {
            address: addr,
            symbol: "EURC".to_string(),
            name: "Euro Coin".to_string(),
            decimals: 6,
        };

        Self::new(vec![
            ChainConfig {
                chain_id: 11155111,
                name: "Ethereum Sepolia".to_string(),
                short_name: "ETH Sepolia".to_string(),
                native_currency: eth("Sepolia Ether"),
                rpc_url: format!("https://eth-sepolia.g.alchemy.com/v2/{alchemy_api_key}"),
                block_explorer_url: "https://sepolia.etherscan.io".to_string(),
                tokens: ChainTokens {
                    usdc: Some(usdc(address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238"))),
                    local_stablecoin: Some(cope(address!(
                        "19ac2612e560b2bbedf88660a2566ef53c0a15a1"
                    ))),
                    eur_stablecoin: Some(eurc(address!(
                        "08210f9170f89ab7658f0b5e3ff39b0e03c594d4"
                    ))),
                },
                is_default: true,
            },
            ChainConfig {
                chain_id: 1301,
                name: "Unichain Sepolia".to_string(),
                short_name: "UNI Sepolia".to_string(),
                native_currency: eth("Unichain Ether"),
                rpc_url: format!("https://unichain-sepolia.g.alchemy.com/v2/{alchemy_api_key}"),
                block_explorer_url: "https://unichain-sepolia.blockscout.com".to_string(),
                tokens: ChainTokens {
                    usdc: Some(usdc(address!("31d0220469e10c4e71834a79b1f276d740d3768f"))),
                    local_stablecoin: Some(cope(address!(
                        "bb0d7c4141ee1fed53db766e1ffcb9c618df8260"
                    ))),
                    eur_stablecoin: None,
                },
                is_default: false,
            },
            ChainConfig {
                chain_id: 11155420,
                name: "Optimism Sepolia".to_string(),
                short_name: "OP Sepolia".to_string(),
                native_currency: eth("Sepolia Ether"),
                rpc_url: format!("https://opt-sepolia.g.alchemy.com/v2/{alchemy_api_key}"),
                block_explorer_url: "https://sepolia-optimism.etherscan.io".to_string(),
                tokens: ChainTokens {
                    usdc: Some(usdc(address!("5fd84259d66cd46123540766be93dfe6d43130d7"))),
                    local_stablecoin: Some(cope(address!(
                        "a5bfe574ac515c14f37c25a92202fa5a58d8e723"
                    ))),
                    eur_stablecoin: None,
                },
                is_default: false,
            },
            ChainConfig {
                chain_id: 84532,
                name: "Base Sepolia".to_string(),
                short_name: "BASE Sepolia".to_string(),
                native_currency: eth("Sepolia Ether"),
                rpc_url: format!("https://base-sepolia.g.alchemy.com/v2/{alchemy_api_key}"),
                block_explorer_url: "https://sepolia.basescan.org".to_string(),
                tokens: ChainTokens {
                    usdc: Some(usdc(address!("036cbd53842c5426634e7929541ec2318f3dcf7e"))),
                    local_stablecoin: Some(cope(address!(
                        "b934dcb57fb0673b7bc0fca590c5508f1cde955d"
                    ))),
                    eur_stablecoin: Some(eurc(address!(
                        "808456652fdb597867f38412077a9182bf77359f"
                    ))),
                },
                is_default: false,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn registry() -> ChainRegistry {
        ChainRegistry::sepolia_testnets("test-key")
    }

    #[test]
    fn test_get_chain() {
        let reg = registry();
        assert_eq!(reg.get_chain(11155111).unwrap().short_name, "ETH Sepolia");
        assert!(reg.get_chain(999999).is_none());
    }

    #[test]
    fn test_declaration_order_is_stable() {
        let reg = registry();
        let ids: Vec<u64> = reg.chains().iter().map(|c| c.chain_id).collect();
        assert_eq!(ids, vec![11155111, 1301, 11155420, 84532]);
    }

    #[test]
    fn test_default_chain_is_sepolia() {
        let reg = registry();
        assert_eq!(reg.default_chain().unwrap().chain_id, 11155111);
    }

    #[test]
    fn test_token_absence_is_meaningful() {
        let reg = registry();
        // EURC exists on Sepolia and Base Sepolia but not on the others
        assert!(reg.get_token(11155111, TokenRole::EurStablecoin).is_some());
        assert!(reg.get_token(1301, TokenRole::EurStablecoin).is_none());
        assert!(reg.get_token(11155420, TokenRole::EurStablecoin).is_none());
        assert!(reg.get_token(84532, TokenRole::EurStablecoin).is_some());
    }

    #[test]
    fn test_usdc_decimals() {
        let reg = registry();
        for chain in reg.chains() {
            let usdc = chain.tokens.get(TokenRole::Usdc).unwrap();
            assert_eq!(usdc.decimals, 6, "USDC is 6 decimals on {}", chain.name);
        }
        let cope = reg.get_token(11155111, TokenRole::LocalStablecoin).unwrap();
        assert_eq!(cope.decimals, 18);
    }

    #[test]
    fn test_chain_tokens_order() {
        let reg = registry();
        let symbols: Vec<&str> = reg
            .chain_tokens(84532)
            .iter()
            .map(|t| t.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["USDC", "COPe", "EURC"]);
    }

    #[test]
    fn test_explorer_tx_url() {
        let reg = registry();
        let chain = reg.get_chain(84532).unwrap();
        let url = chain.explorer_tx_url(B256::with_last_byte(1));
        assert!(url.starts_with("https://sepolia.basescan.org/tx/0x"));
    }

    #[test]
    fn test_rpc_url_carries_api_key() {
        let reg = ChainRegistry::sepolia_testnets("abc123");
        assert!(reg.get_chain(11155111).unwrap().rpc_url.ends_with("/abc123"));
    }
}

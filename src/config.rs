//! Configuration for the gateway-transfer binary
//!
//! Environment-driven: loads a `.env` file if present, then reads from the
//! process environment. The private key is redacted from Debug output.

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Transfer parameters for one binary invocation
#[derive(Debug, Clone)]
pub struct TransferParams {
    pub source_chain_id: u64,
    pub destination_chain_id: u64,
    pub amount: String,
    pub recipient: String,
}

/// Main configuration for the transfer binary
#[derive(Clone)]
pub struct Config {
    /// Alchemy API key used to build per-chain RPC URLs
    pub alchemy_api_key: String,
    /// Hex private key of the sending account
    pub private_key: String,
    /// Attestation API base URL. When unset the binary falls back to the
    /// simulated attestation service (testnets/demos only).
    pub attestation_api_url: Option<String>,
    pub finality_blocks: u64,
    pub confirmation_poll: Duration,
    pub confirmation_timeout: Duration,
    pub attestation_timeout: Duration,
    pub transfer: TransferParams,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("alchemy_api_key", &"<redacted>")
            .field("private_key", &"<redacted>")
            .field("attestation_api_url", &self.attestation_api_url)
            .field("finality_blocks", &self.finality_blocks)
            .field("confirmation_poll", &self.confirmation_poll)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("attestation_timeout", &self.attestation_timeout)
            .field("transfer", &self.transfer)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads .env file if present, then reads from environment.
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let transfer = TransferParams {
            source_chain_id: require_parsed("TRANSFER_SOURCE_CHAIN_ID")?,
            destination_chain_id: require_parsed("TRANSFER_DESTINATION_CHAIN_ID")?,
            amount: require("TRANSFER_AMOUNT")?,
            recipient: require("TRANSFER_RECIPIENT")?,
        };

        Ok(Self {
            alchemy_api_key: require("ALCHEMY_API_KEY")?,
            private_key: require("WALLET_PRIVATE_KEY")?,
            attestation_api_url: env::var("ATTESTATION_API_URL").ok(),
            finality_blocks: parsed_or("FINALITY_BLOCKS", 1)?,
            confirmation_poll: Duration::from_millis(parsed_or("CONFIRMATION_POLL_MS", 1000)?),
            confirmation_timeout: Duration::from_secs(parsed_or("CONFIRMATION_TIMEOUT_SECS", 180)?),
            attestation_timeout: Duration::from_secs(parsed_or("ATTESTATION_TIMEOUT_SECS", 600)?),
            transfer,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| eyre!("{} environment variable is required", name))
}

fn require_parsed<T: std::str::FromStr>(name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    require(name)?
        .parse()
        .wrap_err_with(|| format!("{} must be a valid value", name))
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .wrap_err_with(|| format!("{} must be a valid value", name)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            alchemy_api_key: "key-material".to_string(),
            private_key: "0xdeadbeef".to_string(),
            attestation_api_url: None,
            finality_blocks: 1,
            confirmation_poll: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(180),
            attestation_timeout: Duration::from_secs(600),
            transfer: TransferParams {
                source_chain_id: 11155111,
                destination_chain_id: 84532,
                amount: "10.5".to_string(),
                recipient: "0x0000000000000000000000000000000000000042".to_string(),
            },
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("0xdeadbeef"));
        assert!(!debug.contains("key-material"));
        assert!(debug.contains("<redacted>"));
    }
}

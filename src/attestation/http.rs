//! HTTP attestation client
//!
//! Polls the bridging protocol's attestation API over JSON/HTTP. The API is
//! Iris-style: `GET {base}/v1/attestations/{initiation_tx}` returns a
//! status of `pending_confirmations` until the attestation is signed, then
//! `complete` with the transfer id and proof.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use eyre::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::AttestationError;
use crate::types::{TransferId, TxHash};

use super::{Attestation, AttestationService};

/// Attestation API response
#[derive(Debug, Deserialize)]
struct AttestationResponse {
    status: String,
    #[serde(rename = "transferId")]
    transfer_id: Option<String>,
    attestation: Option<String>,
}

/// HTTP client for an attestation API
pub struct HttpAttestationService {
    base_url: String,
    client: Client,
}

impl HttpAttestationService {
    /// Create a new attestation client for the given API base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl AttestationService for HttpAttestationService {
    async fn fetch_attestation(
        &self,
        _source_chain_id: u64,
        initiation_tx: TxHash,
    ) -> Result<Option<Attestation>, AttestationError> {
        let url = format!("{}/v1/attestations/{}", self.base_url, initiation_tx);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AttestationError::Service(e.to_string()))?;

        // The API answers 404 until it has observed the initiation
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AttestationError::Service(format!(
                "attestation API returned {}",
                response.status()
            )));
        }

        let body: AttestationResponse = response
            .json()
            .await
            .map_err(|e| AttestationError::Malformed(e.to_string()))?;

        match body.status.as_str() {
            "complete" => {
                let transfer_id = body
                    .transfer_id
                    .ok_or_else(|| {
                        AttestationError::Malformed("complete response missing transferId".into())
                    })
                    .and_then(|id| {
                        TransferId::from_hex(&id)
                            .map_err(|e| AttestationError::Malformed(e.to_string()))
                    })?;

                let proof = body
                    .attestation
                    .ok_or_else(|| {
                        AttestationError::Malformed("complete response missing attestation".into())
                    })
                    .and_then(|hex_str| {
                        hex::decode(hex_str.strip_prefix("0x").unwrap_or(&hex_str))
                            .map(Bytes::from)
                            .map_err(|e| AttestationError::Malformed(e.to_string()))
                    })?;

                Ok(Some(Attestation { transfer_id, proof }))
            }
            "pending" | "pending_confirmations" => Ok(None),
            other => Err(AttestationError::Malformed(format!(
                "unknown attestation status '{other}'"
            ))),
        }
    }
}

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use eyre::WrapErr;

use gateway_transfer::attestation::{
    AttestationPollConfig, AttestationService, HttpAttestationService, SimulatedAttestationService,
};
use gateway_transfer::config::Config;
use gateway_transfer::evm::{EvmSubmitter, EvmSubmitterConfig};
use gateway_transfer::gateway::GatewayDeployments;
use gateway_transfer::orchestrator::{CrossChainOrchestrator, OrchestratorConfig};
use gateway_transfer::registry::ChainRegistry;
use gateway_transfer::types::{TransferPhase, TransferRequest};
use gateway_transfer::TransactionSubmitter;

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    tracing::info!("Starting gateway transfer");

    let config = Config::load()?;
    tracing::info!(
        source_chain_id = config.transfer.source_chain_id,
        destination_chain_id = config.transfer.destination_chain_id,
        amount = %config.transfer.amount,
        "Configuration loaded"
    );

    let registry = Arc::new(ChainRegistry::sepolia_testnets(&config.alchemy_api_key));
    let deployments = Arc::new(GatewayDeployments::sepolia_testnets());

    let submitter = Arc::new(EvmSubmitter::new(
        &registry,
        &config.private_key,
        EvmSubmitterConfig {
            finality_blocks: config.finality_blocks,
            poll_interval: config.confirmation_poll,
            confirmation_timeout: config.confirmation_timeout,
        },
    )?);
    tracing::info!(
        signer = %submitter.signer_address(),
        supports_sponsorship = submitter.capabilities().supports_sponsorship,
        "Submitter ready"
    );

    let attestation: Arc<dyn AttestationService> = match &config.attestation_api_url {
        Some(url) => Arc::new(HttpAttestationService::new(url.clone())?),
        None => {
            tracing::warn!(
                "ATTESTATION_API_URL not set; using the SIMULATED attestation service. \
                 Do not use this against real funds."
            );
            Arc::new(SimulatedAttestationService::default())
        }
    };

    let orchestrator = CrossChainOrchestrator::new(
        registry.clone(),
        deployments,
        submitter,
        attestation,
        OrchestratorConfig {
            attestation: AttestationPollConfig {
                timeout: config.attestation_timeout,
                ..AttestationPollConfig::default()
            },
        },
    );

    let request = TransferRequest {
        source_chain_id: config.transfer.source_chain_id,
        destination_chain_id: config.transfer.destination_chain_id,
        amount: config.transfer.amount.clone(),
        recipient: Address::from_str(&config.transfer.recipient)
            .wrap_err("Invalid recipient address")?,
    };

    let handle = orchestrator.start(request);

    // Ctrl+C / SIGTERM abandons the transfer before its next step
    let canceller = handle.canceller();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Shutdown signal received, abandoning transfer before its next step");
        let _ = canceller.send(()).await;
    });

    // Log every phase transition while the transfer runs
    let mut status_rx = handle.subscribe();
    let progress = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            tracing::info!(
                phase = %status.phase,
                transactions = status.transactions.len(),
                "Transfer phase"
            );
        }
    });

    let status = handle.wait().await;
    progress.abort();

    for tx in &status.transactions {
        let link = registry
            .get_chain(tx.chain_id)
            .map(|c| c.explorer_tx_url(tx.tx_hash))
            .unwrap_or_else(|| tx.tx_hash.to_string());
        tracing::info!(step = %tx.step, chain_id = tx.chain_id, tx = %link, "Confirmed step");
    }

    match status.phase {
        TransferPhase::Completed => {
            tracing::info!("Transfer completed");
            Ok(())
        }
        TransferPhase::Abandoned => {
            tracing::warn!(
                transactions = status.transactions.len(),
                "Transfer abandoned; confirmed steps are not reversed"
            );
            Ok(())
        }
        _ => {
            let detail = status
                .error
                .as_ref()
                .map(|d| format!("{} (during {})", d.error, d.phase))
                .unwrap_or_else(|| "unknown error".to_string());
            Err(eyre::eyre!("Transfer failed: {detail}"))
        }
    }
}

/// Initialize tracing/logging with structured output
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gateway_transfer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}

//! Cross-chain transfer orchestrator
//!
//! Owns the per-transfer state machine and drives it to completion or
//! failure by issuing encoded gateway calls through the injected submitter:
//!
//! ```text
//! Idle -> Approving -> Depositing -> AwaitingCompletion -> Completed
//! any non-terminal --(failure)--> Failed
//! any non-terminal --(caller cancel)--> Abandoned
//! ```
//!
//! Strict linear progression: a step is issued only after the previous
//! step's transaction is confirmed, never merely submitted — a deposit sent
//! before the approval is mined reverts on-chain. No step is ever retried
//! automatically; blind resubmission of blockchain transactions risks
//! duplicate approvals and double-spends. The caller decides whether to
//! retry with a fresh request, or to drive just the completion step via
//! [`CrossChainOrchestrator::resume_completion`] when a transfer is stuck
//! with funds escrowed but not yet minted.

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::attestation::{
    cancel_signalled, poll_attestation, AttestationPollConfig, AttestationService, PollOutcome,
};
use crate::error::TransferError;
use crate::gateway::{
    encode_approve, encode_complete_transfer, encode_deposit, encode_initiate_transfer,
    CallRequest, GatewayDeployment, GatewayDeployments,
};
use crate::registry::{ChainRegistry, TokenInfo};
use crate::submitter::TransactionSubmitter;
use crate::types::{TokenRole, TransferPhase, TransferRequest, TransferStatus, TransferStep, TxHash};

/// Orchestrator tuning
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Backoff and deadline for the attestation wait
    pub attestation: AttestationPollConfig,
}

/// Handle to one in-flight transfer.
///
/// The status receiver observes every phase transition; dropping the handle
/// does not cancel the transfer (already-submitted transactions cannot be
/// taken back anyway) — cancellation is always an explicit signal.
pub struct TransferHandle {
    status: watch::Receiver<TransferStatus>,
    cancel: mpsc::Sender<()>,
    task: JoinHandle<TransferStatus>,
}

impl TransferHandle {
    /// Snapshot of the current status
    pub fn status(&self) -> TransferStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status updates
    pub fn subscribe(&self) -> watch::Receiver<TransferStatus> {
        self.status.clone()
    }

    /// A sender that cancels the transfer when signalled
    pub fn canceller(&self) -> mpsc::Sender<()> {
        self.cancel.clone()
    }

    /// Ask the transfer to stop before its next step. Already-confirmed
    /// on-chain transactions are not (and cannot be) reversed.
    pub async fn cancel(&self) {
        let _ = self.cancel.send(()).await;
    }

    /// Wait for the transfer to reach a terminal phase
    pub async fn wait(self) -> TransferStatus {
        match self.task.await {
            Ok(status) => status,
            // the task panicked; the watch holds the last published state
            Err(_) => self.status.borrow().clone(),
        }
    }
}

/// Per-transfer resolution of registry + deployment lookups
struct ResolvedTransfer<'a> {
    source_deployment: &'a GatewayDeployment,
    destination_deployment: &'a GatewayDeployment,
    source_wallet: Address,
    destination_minter: Address,
    source_usdc: &'a TokenInfo,
    destination_usdc: &'a TokenInfo,
}

/// Drives cross-chain transfers. Cheap to clone; registry, deployments,
/// and collaborators are shared read-only across concurrent transfers,
/// while each transfer owns its status exclusively.
#[derive(Clone)]
pub struct CrossChainOrchestrator {
    registry: Arc<ChainRegistry>,
    deployments: Arc<GatewayDeployments>,
    submitter: Arc<dyn TransactionSubmitter>,
    attestation: Arc<dyn AttestationService>,
    config: OrchestratorConfig,
}

enum StepEnd {
    Cancelled,
    Failed(TransferError),
}

impl CrossChainOrchestrator {
    pub fn new(
        registry: Arc<ChainRegistry>,
        deployments: Arc<GatewayDeployments>,
        submitter: Arc<dyn TransactionSubmitter>,
        attestation: Arc<dyn AttestationService>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            deployments,
            submitter,
            attestation,
            config,
        }
    }

    /// Start a transfer in the background and return its handle.
    pub fn start(&self, request: TransferRequest) -> TransferHandle {
        let status = TransferStatus::new(request.clone());
        self.spawn(request, status, None)
    }

    /// Re-attempt only the completion step of a transfer whose initiation
    /// already confirmed on the source chain (funds escrowed, nothing
    /// minted yet): wait for the attestation of `initiation_tx`, then
    /// submit `completeCrossChainTransfer` on the destination chain.
    pub fn resume_completion(
        &self,
        request: TransferRequest,
        initiation_tx: TxHash,
    ) -> TransferHandle {
        let mut status = TransferStatus::new(request.clone());
        status.advance(TransferPhase::AwaitingCompletion);
        status.record_transaction(TransferStep::Initiate, request.source_chain_id, initiation_tx);
        self.spawn(request, status, Some(initiation_tx))
    }

    /// Run a transfer on the current task, reporting transitions through
    /// `status_tx` and honoring `cancel`. Building block for [`Self::start`];
    /// useful where spawning is undesirable.
    pub async fn execute(
        &self,
        request: TransferRequest,
        status_tx: watch::Sender<TransferStatus>,
        cancel: mpsc::Receiver<()>,
    ) -> TransferStatus {
        let status = TransferStatus::new(request.clone());
        self.clone().run(request, status, None, status_tx, cancel).await
    }

    fn spawn(
        &self,
        request: TransferRequest,
        status: TransferStatus,
        resume_from: Option<TxHash>,
    ) -> TransferHandle {
        let (status_tx, status_rx) = watch::channel(status.clone());
        let (cancel_tx, cancel_rx) = mpsc::channel(1);
        let orchestrator = self.clone();
        let task = tokio::spawn(async move {
            orchestrator
                .run(request, status, resume_from, status_tx, cancel_rx)
                .await
        });

        TransferHandle {
            status: status_rx,
            cancel: cancel_tx,
            task,
        }
    }

    async fn run(
        self,
        request: TransferRequest,
        mut status: TransferStatus,
        resume_from: Option<TxHash>,
        status_tx: watch::Sender<TransferStatus>,
        mut cancel: mpsc::Receiver<()>,
    ) -> TransferStatus {
        let publish = |status: &TransferStatus| {
            let _ = status_tx.send(status.clone());
        };
        publish(&status);

        // Entry preconditions: checked before any call is issued
        let resolved = match self.resolve(&request) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(error = %error, "Transfer rejected");
                status.fail(error);
                publish(&status);
                return status;
            }
        };

        info!(
            source_chain_id = request.source_chain_id,
            destination_chain_id = request.destination_chain_id,
            amount = %request.amount,
            recipient = %request.recipient,
            "Starting cross-chain transfer"
        );

        let initiation_tx = match resume_from {
            Some(tx_hash) => tx_hash,
            None => {
                match self
                    .run_source_steps(&request, &resolved, &mut status, &publish, &mut cancel)
                    .await
                {
                    Ok(tx_hash) => tx_hash,
                    Err(()) => return status,
                }
            }
        };

        // Wait for the off-chain attestation of the initiation, bounded and
        // cancellable, then mint on the destination chain.
        let attestation = match poll_attestation(
            self.attestation.as_ref(),
            request.source_chain_id,
            initiation_tx,
            &self.config.attestation,
            &mut cancel,
        )
        .await
        {
            PollOutcome::Attested(attestation) => attestation,
            PollOutcome::TimedOut { waited } => {
                warn!(
                    waited_secs = waited.as_secs(),
                    initiation_tx = %initiation_tx,
                    "Attestation deadline passed; funds remain escrowed on the source chain"
                );
                status.fail(TransferError::AttestationTimeout {
                    waited_secs: waited.as_secs(),
                });
                publish(&status);
                return status;
            }
            PollOutcome::Cancelled => {
                status.abandon();
                publish(&status);
                return status;
            }
        };

        let complete_call = match encode_complete_transfer(
            resolved.destination_minter,
            resolved.destination_deployment.usdc,
            request.recipient,
            &request.amount,
            resolved.destination_usdc.decimals,
            attestation.transfer_id,
            resolved.source_deployment.domain,
        ) {
            Ok(call) => call,
            Err(error) => {
                status.fail(error.into());
                publish(&status);
                return status;
            }
        };

        match self
            .confirmed_step(
                request.destination_chain_id,
                complete_call,
                TransferStep::Complete,
                &mut cancel,
            )
            .await
        {
            Ok(tx_hash) => {
                status.record_transaction(
                    TransferStep::Complete,
                    request.destination_chain_id,
                    tx_hash,
                );
            }
            Err(end) => {
                self.settle(&mut status, end);
                publish(&status);
                return status;
            }
        }

        status.advance(TransferPhase::Completed);
        publish(&status);
        info!(
            transfer_id = %attestation.transfer_id,
            transactions = status.transactions.len(),
            "Cross-chain transfer completed"
        );
        status
    }

    /// Approve, deposit, and initiate on the source chain. Returns the
    /// confirmed initiation hash, or marks the status terminal and returns
    /// `Err(())`.
    async fn run_source_steps(
        &self,
        request: &TransferRequest,
        resolved: &ResolvedTransfer<'_>,
        status: &mut TransferStatus,
        publish: &impl Fn(&TransferStatus),
        cancel: &mut mpsc::Receiver<()>,
    ) -> Result<TxHash, ()> {
        let decimals = resolved.source_usdc.decimals;
        let usdc = resolved.source_deployment.usdc;

        // allowance for exactly this transfer's amount
        let steps: [(TransferPhase, TransferStep, Result<CallRequest, _>); 3] = [
            (
                TransferPhase::Approving,
                TransferStep::Approve,
                encode_approve(usdc, resolved.source_wallet, &request.amount, decimals),
            ),
            (
                TransferPhase::Depositing,
                TransferStep::Deposit,
                encode_deposit(resolved.source_wallet, usdc, &request.amount, decimals),
            ),
            (
                TransferPhase::AwaitingCompletion,
                TransferStep::Initiate,
                encode_initiate_transfer(
                    resolved.source_wallet,
                    usdc,
                    resolved.destination_deployment.domain,
                    request.recipient,
                    &request.amount,
                    decimals,
                ),
            ),
        ];

        let mut initiation_tx = None;
        for (phase, step, call) in steps {
            status.advance(phase);
            publish(status);

            let call = match call {
                Ok(call) => call,
                Err(error) => {
                    status.fail(error.into());
                    publish(status);
                    return Err(());
                }
            };

            match self
                .confirmed_step(request.source_chain_id, call, step, cancel)
                .await
            {
                Ok(tx_hash) => {
                    status.record_transaction(step, request.source_chain_id, tx_hash);
                    publish(status);
                    if step == TransferStep::Initiate {
                        initiation_tx = Some(tx_hash);
                    }
                }
                Err(end) => {
                    self.settle(status, end);
                    publish(status);
                    return Err(());
                }
            }
        }

        // set for the Initiate arm above on the success path
        Ok(initiation_tx.expect("initiate step ran"))
    }

    /// Submit one call and wait for its confirmation, racing the cancel
    /// signal at both suspension points.
    async fn confirmed_step(
        &self,
        chain_id: u64,
        call: CallRequest,
        step: TransferStep,
        cancel: &mut mpsc::Receiver<()>,
    ) -> Result<TxHash, StepEnd> {
        let tx_hash = tokio::select! {
            _ = cancel_signalled(cancel) => return Err(StepEnd::Cancelled),
            result = self.submitter.submit(chain_id, &call) => result
                .map_err(|e| StepEnd::Failed(TransferError::from_submitter(step, e)))?,
        };

        info!(step = %step, chain_id, tx_hash = %tx_hash, "Step submitted, awaiting confirmation");

        let receipt = tokio::select! {
            _ = cancel_signalled(cancel) => return Err(StepEnd::Cancelled),
            result = self.submitter.wait_for_confirmation(chain_id, tx_hash) => result
                .map_err(|e| StepEnd::Failed(TransferError::from_submitter(step, e)))?,
        };

        info!(step = %step, chain_id, tx_hash = %receipt.tx_hash, block_number = receipt.block_number, "Step confirmed");
        Ok(receipt.tx_hash)
    }

    fn settle(&self, status: &mut TransferStatus, end: StepEnd) {
        match end {
            StepEnd::Cancelled => {
                info!(phase = %status.phase, "Transfer abandoned by caller");
                status.abandon();
            }
            StepEnd::Failed(error) => {
                warn!(phase = %status.phase, error = %error, "Transfer failed");
                status.fail(error);
            }
        }
    }

    /// Registry + deployment lookup for one leg of the transfer
    fn resolve_leg(
        &self,
        chain_id: u64,
    ) -> Result<(&GatewayDeployment, &TokenInfo), TransferError> {
        self.registry.get_chain(chain_id).ok_or_else(|| {
            TransferError::Configuration(format!("chain {chain_id} is not registered"))
        })?;
        let deployment = self.deployments.get(chain_id).ok_or_else(|| {
            TransferError::Configuration(format!("no gateway deployment for chain {chain_id}"))
        })?;
        if !deployment.is_bridge_ready() {
            return Err(TransferError::Configuration(format!(
                "chain {chain_id} is not bridge-ready (escrow or minter contract missing)"
            )));
        }
        let usdc = self
            .registry
            .get_token(chain_id, TokenRole::Usdc)
            .ok_or_else(|| {
                TransferError::Configuration(format!("chain {chain_id} has no USDC token"))
            })?;
        Ok((deployment, usdc))
    }

    /// Check entry preconditions and resolve per-chain configuration.
    /// Nothing is submitted before this succeeds.
    fn resolve<'a>(
        &'a self,
        request: &TransferRequest,
    ) -> Result<ResolvedTransfer<'a>, TransferError> {
        if request.source_chain_id == request.destination_chain_id {
            return Err(TransferError::Configuration(
                "source and destination chains must differ".to_string(),
            ));
        }
        if request.recipient == Address::ZERO {
            return Err(TransferError::Configuration(
                "recipient address must not be zero".to_string(),
            ));
        }

        let (source_deployment, source_usdc) = self.resolve_leg(request.source_chain_id)?;
        let (destination_deployment, destination_usdc) =
            self.resolve_leg(request.destination_chain_id)?;

        // positivity checked up front so a bad amount never reaches a signer
        let units =
            crate::gateway::parse_base_units(&request.amount, source_usdc.decimals)
                .map_err(|e| TransferError::Configuration(e.to_string()))?;
        if units.is_zero() {
            return Err(TransferError::Configuration(format!(
                "amount '{}' is not positive",
                request.amount
            )));
        }

        // bridge-ready was checked above, so both unwraps hold
        let source_wallet = source_deployment.wallet.expect("bridge-ready source");
        let destination_minter = destination_deployment
            .minter
            .expect("bridge-ready destination");

        Ok(ResolvedTransfer {
            source_deployment,
            destination_deployment,
            source_wallet,
            destination_minter,
            source_usdc,
            destination_usdc,
        })
    }
}

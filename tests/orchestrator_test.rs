//! Integration tests for the cross-chain transfer state machine
//!
//! Everything runs against in-memory submitter/attestation mocks; no chain
//! or network access. Time-dependent tests run under tokio's paused clock.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, B256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use gateway_transfer::attestation::{
    Attestation, AttestationPollConfig, AttestationService, SimulatedAttestationService,
};
use gateway_transfer::error::{AttestationError, SubmitterError, TransferError};
use gateway_transfer::gateway::contracts::{GatewayMinter, GatewayWallet, ERC20};
use gateway_transfer::gateway::{CallRequest, GatewayDeployment, GatewayDeployments};
use gateway_transfer::orchestrator::{CrossChainOrchestrator, OrchestratorConfig};
use gateway_transfer::registry::ChainRegistry;
use gateway_transfer::submitter::{TransactionSubmitter, TxReceipt};
use gateway_transfer::types::{
    BridgeDomain, TransferId, TransferPhase, TransferRequest, TransferStep, TxHash,
};

mod mocks {
    use super::*;

    /// Scriptable in-memory submitter recording every submission
    #[derive(Default)]
    pub struct MockSubmitter {
        pub submitted: Mutex<Vec<(u64, CallRequest)>>,
        /// Reject the Nth submission (0-indexed) instead of accepting it
        pub fail_submit_at: Option<usize>,
        /// Report the Nth submission's transaction as reverted
        pub revert_confirm_at: Option<usize>,
        /// Never return from the Nth submission's confirmation wait
        pub hang_confirm_at: Option<usize>,
    }

    impl MockSubmitter {
        pub fn submissions(&self) -> Vec<(u64, CallRequest)> {
            self.submitted.lock().unwrap().clone()
        }

        pub fn submission_count(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TransactionSubmitter for MockSubmitter {
        async fn submit(&self, chain_id: u64, call: &CallRequest) -> Result<TxHash, SubmitterError> {
            let mut submitted = self.submitted.lock().unwrap();
            let index = submitted.len();
            if self.fail_submit_at == Some(index) {
                return Err(SubmitterError::Rejected("user rejected the request".into()));
            }
            submitted.push((chain_id, call.clone()));
            Ok(B256::with_last_byte(index as u8 + 1))
        }

        async fn wait_for_confirmation(
            &self,
            _chain_id: u64,
            tx_hash: TxHash,
        ) -> Result<TxReceipt, SubmitterError> {
            let index = (tx_hash.0[31] - 1) as usize;
            if self.hang_confirm_at == Some(index) {
                std::future::pending::<()>().await;
            }
            if self.revert_confirm_at == Some(index) {
                return Err(SubmitterError::Reverted(tx_hash));
            }
            Ok(TxReceipt {
                tx_hash,
                block_number: 100 + index as u64,
            })
        }
    }

    /// Attestation service that either resolves immediately or never
    pub struct MockAttestation {
        pub attestation: Option<Attestation>,
    }

    impl MockAttestation {
        pub fn ready() -> Self {
            Self {
                attestation: Some(Attestation {
                    transfer_id: TransferId(B256::with_last_byte(0xAA)),
                    proof: alloy::primitives::Bytes::from_static(b"proof"),
                }),
            }
        }

        pub fn never() -> Self {
            Self { attestation: None }
        }
    }

    #[async_trait]
    impl AttestationService for MockAttestation {
        async fn fetch_attestation(
            &self,
            _source_chain_id: u64,
            _initiation_tx: TxHash,
        ) -> Result<Option<Attestation>, AttestationError> {
            Ok(self.attestation.clone())
        }
    }
}

use mocks::{MockAttestation, MockSubmitter};

const SOURCE: u64 = 11155111; // Ethereum Sepolia
const DESTINATION: u64 = 84532; // Base Sepolia

fn request() -> TransferRequest {
    TransferRequest {
        source_chain_id: SOURCE,
        destination_chain_id: DESTINATION,
        amount: "10.5".to_string(),
        recipient: Address::with_last_byte(0x42),
    }
}

fn orchestrator(
    submitter: Arc<MockSubmitter>,
    attestation: Arc<dyn AttestationService>,
) -> CrossChainOrchestrator {
    CrossChainOrchestrator::new(
        Arc::new(ChainRegistry::sepolia_testnets("test-key")),
        Arc::new(GatewayDeployments::sepolia_testnets()),
        submitter,
        attestation,
        OrchestratorConfig::default(),
    )
}

#[tokio::test]
async fn happy_path_visits_phases_in_order() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let status = orch.start(request()).wait().await;

    assert_eq!(status.phase, TransferPhase::Completed);
    assert!(status.error.is_none());
    assert_eq!(
        status.phase_history,
        vec![
            TransferPhase::Idle,
            TransferPhase::Approving,
            TransferPhase::Depositing,
            TransferPhase::AwaitingCompletion,
            TransferPhase::Completed,
        ]
    );
}

#[tokio::test]
async fn happy_path_submits_three_source_calls_and_one_destination_call() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let status = orch.start(request()).wait().await;
    assert_eq!(status.phase, TransferPhase::Completed);
    assert_eq!(status.tx_hashes().len(), 4);

    let submissions = submitter.submissions();
    assert_eq!(submissions.len(), 4);
    let source_calls: Vec<_> = submissions.iter().filter(|(c, _)| *c == SOURCE).collect();
    let dest_calls: Vec<_> = submissions
        .iter()
        .filter(|(c, _)| *c == DESTINATION)
        .collect();
    assert_eq!(source_calls.len(), 3);
    assert_eq!(dest_calls.len(), 1);

    let steps: Vec<TransferStep> = status.transactions.iter().map(|t| t.step).collect();
    assert_eq!(
        steps,
        vec![
            TransferStep::Approve,
            TransferStep::Deposit,
            TransferStep::Initiate,
            TransferStep::Complete,
        ]
    );
}

#[tokio::test]
async fn calls_target_the_configured_contracts() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));
    orch.start(request()).wait().await;

    let deployments = GatewayDeployments::sepolia_testnets();
    let source = deployments.get(SOURCE).unwrap();
    let destination = deployments.get(DESTINATION).unwrap();
    let submissions = submitter.submissions();

    // approve goes to the token, granting the escrow wallet
    assert_eq!(submissions[0].1.to, source.usdc);
    let approve = ERC20::approveCall::abi_decode(&submissions[0].1.data, true).unwrap();
    assert_eq!(approve.spender, source.wallet.unwrap());
    assert_eq!(approve.amount, alloy::primitives::U256::from(10_500_000u64));

    // deposit and initiate go to the escrow wallet
    assert_eq!(submissions[1].1.to, source.wallet.unwrap());
    assert_eq!(submissions[2].1.to, source.wallet.unwrap());
    let initiate =
        GatewayWallet::initiateCrossChainTransferCall::abi_decode(&submissions[2].1.data, true)
            .unwrap();
    assert_eq!(initiate.destinationDomain, destination.domain.to_u32());
    assert_eq!(initiate.destinationRecipient, Address::with_last_byte(0x42));

    // completion goes to the destination minter with the attested id and
    // the source chain's domain
    assert_eq!(submissions[3].1.to, destination.minter.unwrap());
    let complete =
        GatewayMinter::completeCrossChainTransferCall::abi_decode(&submissions[3].1.data, true)
            .unwrap();
    assert_eq!(complete.transferId, B256::with_last_byte(0xAA));
    assert_eq!(complete.sourceDomain, source.domain.to_u32());
}

#[tokio::test]
async fn same_chain_fails_without_any_submission() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let mut req = request();
    req.destination_chain_id = req.source_chain_id;
    let status = orch.start(req).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    let detail = status.error.as_ref().unwrap();
    assert_eq!(detail.phase, TransferPhase::Idle);
    assert!(matches!(detail.error, TransferError::Configuration(_)));
    assert_eq!(submitter.submission_count(), 0);
}

#[tokio::test]
async fn not_bridge_ready_fails_without_any_submission() {
    let submitter = Arc::new(MockSubmitter::default());
    // destination has a wallet but no minter deployed
    let deployments = GatewayDeployments::new([
        GatewayDeployments::sepolia_testnets().get(SOURCE).unwrap().clone(),
        GatewayDeployment {
            chain_id: DESTINATION,
            usdc: Address::with_last_byte(1),
            domain: BridgeDomain(6),
            wallet: Some(Address::with_last_byte(2)),
            minter: None,
        },
    ]);
    let orch = CrossChainOrchestrator::new(
        Arc::new(ChainRegistry::sepolia_testnets("test-key")),
        Arc::new(deployments),
        submitter.clone(),
        Arc::new(MockAttestation::ready()),
        OrchestratorConfig::default(),
    );

    let status = orch.start(request()).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    assert!(matches!(
        status.error.as_ref().unwrap().error,
        TransferError::Configuration(_)
    ));
    assert_eq!(submitter.submission_count(), 0);
}

#[tokio::test]
async fn unregistered_chain_fails_without_any_submission() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let mut req = request();
    req.destination_chain_id = 424242;
    let status = orch.start(req).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    assert!(matches!(
        status.error.as_ref().unwrap().error,
        TransferError::Configuration(_)
    ));
    assert_eq!(submitter.submission_count(), 0);
}

#[tokio::test]
async fn non_positive_amount_fails_without_any_submission() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let mut req = request();
    req.amount = "0".to_string();
    let status = orch.start(req).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    assert!(matches!(
        status.error.as_ref().unwrap().error,
        TransferError::Configuration(_)
    ));
    assert_eq!(submitter.submission_count(), 0);
}

#[tokio::test]
async fn deposit_failure_keeps_only_the_approval_hash() {
    let submitter = Arc::new(MockSubmitter {
        fail_submit_at: Some(1), // second submission is the deposit
        ..MockSubmitter::default()
    });
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let status = orch.start(request()).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    let detail = status.error.as_ref().unwrap();
    assert_eq!(detail.phase, TransferPhase::Depositing);
    assert!(matches!(
        detail.error,
        TransferError::Submission {
            step: TransferStep::Deposit,
            ..
        }
    ));
    // exactly one confirmed transaction: the approval
    assert_eq!(status.tx_hashes().len(), 1);
    assert_eq!(status.transactions[0].step, TransferStep::Approve);
}

#[tokio::test]
async fn approve_revert_is_distinguished_from_rejection() {
    let submitter = Arc::new(MockSubmitter {
        revert_confirm_at: Some(0),
        ..MockSubmitter::default()
    });
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let status = orch.start(request()).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    let detail = status.error.as_ref().unwrap();
    assert_eq!(detail.phase, TransferPhase::Approving);
    assert!(matches!(
        detail.error,
        TransferError::TransactionReverted {
            step: TransferStep::Approve,
            ..
        }
    ));
    // the reverted transaction is never recorded as a confirmed step
    assert!(status.tx_hashes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn attestation_timeout_is_reported_distinctly() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = CrossChainOrchestrator::new(
        Arc::new(ChainRegistry::sepolia_testnets("test-key")),
        Arc::new(GatewayDeployments::sepolia_testnets()),
        submitter.clone(),
        Arc::new(MockAttestation::never()),
        OrchestratorConfig {
            attestation: AttestationPollConfig {
                timeout: Duration::from_secs(600),
                ..AttestationPollConfig::default()
            },
        },
    );

    // paused clock: the 10-minute deadline elapses in virtual time
    let status = orch.start(request()).wait().await;

    assert_eq!(status.phase, TransferPhase::Failed);
    let detail = status.error.as_ref().unwrap();
    assert_eq!(detail.phase, TransferPhase::AwaitingCompletion);
    assert!(matches!(
        detail.error,
        TransferError::AttestationTimeout { waited_secs } if waited_secs >= 600
    ));
    // approve, deposit, initiate confirmed; completion never submitted
    assert_eq!(status.tx_hashes().len(), 3);
    assert_eq!(submitter.submission_count(), 3);
}

#[tokio::test]
async fn cancellation_abandons_without_error() {
    let submitter = Arc::new(MockSubmitter {
        hang_confirm_at: Some(1), // deposit confirmation never arrives
        ..MockSubmitter::default()
    });
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let handle = orch.start(request());
    let mut status_rx = handle.subscribe();
    status_rx
        .wait_for(|s| s.phase == TransferPhase::Depositing)
        .await
        .unwrap();

    handle.cancel().await;
    let status = handle.wait().await;

    assert_eq!(status.phase, TransferPhase::Abandoned);
    assert!(status.error.is_none());
    assert_eq!(status.phase_history.last(), Some(&TransferPhase::Abandoned));
    // nothing past the hung deposit was ever submitted
    assert!(submitter.submission_count() <= 2);
}

#[tokio::test]
async fn resume_completion_submits_only_the_completion_call() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let initiation_tx = B256::with_last_byte(0x33);
    let status = orch
        .resume_completion(request(), initiation_tx)
        .wait()
        .await;

    assert_eq!(status.phase, TransferPhase::Completed);
    assert_eq!(submitter.submission_count(), 1);
    assert_eq!(submitter.submissions()[0].0, DESTINATION);

    let steps: Vec<TransferStep> = status.transactions.iter().map(|t| t.step).collect();
    assert_eq!(steps, vec![TransferStep::Initiate, TransferStep::Complete]);
    assert_eq!(status.transactions[0].tx_hash, initiation_tx);
}

#[tokio::test(start_paused = true)]
async fn simulated_attestation_completes_the_transfer() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(
        submitter.clone(),
        Arc::new(SimulatedAttestationService::default()),
    );

    let status = orch.start(request()).wait().await;
    assert_eq!(status.phase, TransferPhase::Completed);

    // the simulated transfer id is derived from the initiation hash
    let initiation_tx = status.transactions[2].tx_hash;
    let complete = GatewayMinter::completeCrossChainTransferCall::abi_decode(
        &submitter.submissions()[3].1.data,
        true,
    )
    .unwrap();
    assert_eq!(complete.transferId, keccak256(initiation_tx));
}

#[tokio::test]
async fn concurrent_transfers_do_not_share_state() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let mut other = request();
    other.source_chain_id = DESTINATION;
    other.destination_chain_id = SOURCE;
    other.amount = "1".to_string();

    let (a, b) = tokio::join!(orch.start(request()).wait(), orch.start(other).wait());

    assert_eq!(a.phase, TransferPhase::Completed);
    assert_eq!(b.phase, TransferPhase::Completed);
    assert_eq!(a.tx_hashes().len(), 4);
    assert_eq!(b.tx_hashes().len(), 4);
    assert_eq!(submitter.submission_count(), 8);
    assert_ne!(a.request, b.request);
}

#[tokio::test]
async fn execute_runs_in_place() {
    let submitter = Arc::new(MockSubmitter::default());
    let orch = orchestrator(submitter.clone(), Arc::new(MockAttestation::ready()));

    let (status_tx, status_rx) = tokio::sync::watch::channel(
        gateway_transfer::types::TransferStatus::new(request()),
    );
    let (_cancel_tx, cancel_rx) = tokio::sync::mpsc::channel(1);

    let status = orch.execute(request(), status_tx, cancel_rx).await;
    assert_eq!(status.phase, TransferPhase::Completed);
    assert_eq!(status_rx.borrow().phase, TransferPhase::Completed);
}

//! Milestone coordination: evidence, decisions and fund release.
//!
//! Milestones collect evidence and approver decisions until the campaign's
//! policy authorizes a release. The coordinator keeps the on-chain and
//! portal views in step: decisions are checked against the read model before
//! being submitted, and release never submits a transaction the policy would
//! not back.

use crate::campaign::CampaignContract;
use crate::cid;
use crate::config::ClientConfig;
use crate::contribute::BookkeepingOutcome;
use crate::error::{stage_message, ClientError, Result};
use crate::monitor::{MonitorResult, TransactionMonitor};
use crate::policy::{release_eligible, ApprovalPolicy};
use crate::portal::PortalClient;
use crate::types::{ApprovalOutcome, ApprovalRecord, ApproverRole};
use crate::wallet::WalletProvider;
use ethers::types::{TxHash, U256};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a mined evidence submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceReceipt {
    /// The mined evidence transaction
    pub tx_hash: TxHash,
    /// Digest written on chain
    pub digest: [u8; 32],
    /// Whether the portal recorded the evidence
    pub bookkeeping: BookkeepingOutcome,
}

/// Outcome of a mined approval or rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionReceipt {
    /// The mined decision transaction
    pub tx_hash: TxHash,
    /// Whether the portal recorded the decision
    pub bookkeeping: BookkeepingOutcome,
}

/// Outcome of a mined fund release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReceipt {
    /// The mined release transaction
    pub tx_hash: TxHash,
}

/// Coordinates the milestone flows against the chain and the portal
#[derive(Clone)]
pub struct MilestoneCoordinator {
    /// Wallet provider (approver address, transaction status)
    wallet: Arc<dyn WalletProvider>,
    /// Campaign Core contract
    campaign: Arc<dyn CampaignContract>,
    /// Portal client (read model + records)
    portal: PortalClient,
    /// Transaction monitor
    monitor: TransactionMonitor,
    /// Configuration
    config: Arc<ClientConfig>,
}

impl MilestoneCoordinator {
    /// Create a new milestone coordinator
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        campaign: Arc<dyn CampaignContract>,
        portal: PortalClient,
        monitor: TransactionMonitor,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            wallet,
            campaign,
            portal,
            monitor,
            config,
        }
    }

    /// Submit milestone evidence referenced by an IPFS CIDv0.
    ///
    /// The CID is validated and reduced to its digest before anything is
    /// submitted. The portal record after the mined transaction is best
    /// effort, reported through the receipt.
    pub async fn submit_evidence(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        evidence_cid: &str,
    ) -> Result<EvidenceReceipt> {
        let digest = cid::cid_to_bytes32(evidence_cid)?;
        info!(
            "Submitting evidence {} for milestone {} of campaign {}",
            cid::digest_hex(&digest),
            milestone_id,
            campaign_id
        );

        let tx_hash = self
            .campaign
            .submit_evidence(campaign_id, milestone_id, digest)
            .await
            .map_err(|e| ClientError::ChainError(format!("submitEvidence: {}", stage_message(e))))?;

        self.wait_mined(tx_hash, "evidence").await?;

        let bookkeeping = match self
            .portal
            .record_milestone_evidence(campaign_id, milestone_id, evidence_cid, tx_hash)
            .await
        {
            Ok(()) => BookkeepingOutcome::Recorded {
                id: format!("{:?}", tx_hash),
            },
            Err(e) => {
                warn!(
                    "Evidence {:?} mined but portal record failed: {}",
                    tx_hash, e
                );
                BookkeepingOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(EvidenceReceipt {
            tx_hash,
            digest,
            bookkeeping,
        })
    }

    /// Record an approval for a milestone.
    ///
    /// A role that already has a recorded decision is refused before any
    /// transaction is submitted.
    pub async fn record_approval(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        role: ApproverRole,
    ) -> Result<DecisionReceipt> {
        self.refuse_duplicate(campaign_id, milestone_id, role)
            .await?;

        let tx_hash = self
            .campaign
            .approve_milestone(campaign_id, milestone_id)
            .await
            .map_err(|e| {
                ClientError::ChainError(format!("approveMilestone: {}", stage_message(e)))
            })?;
        info!(
            "Approval by {} submitted for milestone {} of campaign {}: {:?}",
            role, milestone_id, campaign_id, tx_hash
        );

        self.wait_mined(tx_hash, "approval").await?;

        let approver = self.wallet.investor_address().await?;
        let bookkeeping = match self
            .portal
            .record_milestone_approval(campaign_id, milestone_id, approver, tx_hash)
            .await
        {
            Ok(()) => BookkeepingOutcome::Recorded {
                id: format!("{:?}", tx_hash),
            },
            Err(e) => {
                warn!(
                    "Approval {:?} mined but portal record failed: {}",
                    tx_hash, e
                );
                BookkeepingOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(DecisionReceipt {
            tx_hash,
            bookkeeping,
        })
    }

    /// Record a rejection for a milestone. The reason travels with the
    /// on-chain transaction and the portal record.
    pub async fn record_rejection(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        role: ApproverRole,
        reason: &str,
    ) -> Result<DecisionReceipt> {
        self.refuse_duplicate(campaign_id, milestone_id, role)
            .await?;

        let tx_hash = self
            .campaign
            .reject_milestone(campaign_id, milestone_id, reason)
            .await
            .map_err(|e| {
                ClientError::ChainError(format!("rejectMilestone: {}", stage_message(e)))
            })?;
        info!(
            "Rejection by {} submitted for milestone {} of campaign {}: {:?}",
            role, milestone_id, campaign_id, tx_hash
        );

        self.wait_mined(tx_hash, "rejection").await?;

        let approver = self.wallet.investor_address().await?;
        let bookkeeping = match self
            .portal
            .record_milestone_rejection(campaign_id, milestone_id, approver, reason, tx_hash)
            .await
        {
            Ok(()) => BookkeepingOutcome::Recorded {
                id: format!("{:?}", tx_hash),
            },
            Err(e) => {
                warn!(
                    "Rejection {:?} mined but portal record failed: {}",
                    tx_hash, e
                );
                BookkeepingOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(DecisionReceipt {
            tx_hash,
            bookkeeping,
        })
    }

    /// Release a milestone's funds, gated on the campaign's approval policy.
    ///
    /// The policy is evaluated against the portal read model first; an
    /// ineligible milestone never produces a transaction.
    pub async fn release(&self, campaign_id: U256, milestone_id: u64) -> Result<ReleaseReceipt> {
        let state = self
            .portal
            .milestone_approvals(campaign_id, milestone_id)
            .await?;
        let policy: ApprovalPolicy = state.policy.parse()?;

        if !release_eligible(&state.approvals, policy) {
            let reason = ineligibility_reason(&state.approvals, policy);
            info!(
                "Release refused for milestone {} of campaign {}: {}",
                milestone_id, campaign_id, reason
            );
            return Err(ClientError::ReleaseNotAuthorized { reason });
        }

        let tx_hash = self
            .campaign
            .release_funds(campaign_id, milestone_id)
            .await
            .map_err(|e| ClientError::ReleaseFailed(stage_message(e)))?;
        info!(
            "Release submitted for milestone {} of campaign {}: {:?}",
            milestone_id, campaign_id, tx_hash
        );

        match self.monitor.wait_until_mined(tx_hash).await? {
            MonitorResult::Mined => Ok(ReleaseReceipt { tx_hash }),
            MonitorResult::Failed(reason) => Err(ClientError::ReleaseFailed(reason)),
            MonitorResult::Timeout => Err(ClientError::ReleaseFailed(format!(
                "transaction {:?} not mined within {}s",
                tx_hash, self.config.tx_timeout_secs
            ))),
        }
    }

    /// Error out if `role` already has a decision on this milestone
    async fn refuse_duplicate(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        role: ApproverRole,
    ) -> Result<()> {
        let state = self
            .portal
            .milestone_approvals(campaign_id, milestone_id)
            .await?;

        if state.approvals.iter().any(|record| record.role == role) {
            return Err(ClientError::DuplicateApproval { role });
        }
        Ok(())
    }

    /// Wait for a decision-stage transaction, mapping failure uniformly
    async fn wait_mined(&self, tx_hash: TxHash, stage: &str) -> Result<()> {
        match self.monitor.wait_until_mined(tx_hash).await? {
            MonitorResult::Mined => Ok(()),
            MonitorResult::Failed(reason) => Err(ClientError::ChainError(format!(
                "{} transaction {:?} {}",
                stage, tx_hash, reason
            ))),
            MonitorResult::Timeout => Err(ClientError::TransactionTimeout(
                self.config.tx_timeout_secs,
            )),
        }
    }
}

/// Explain why the evaluator said no, for the release refusal
fn ineligibility_reason(approvals: &[ApprovalRecord], policy: ApprovalPolicy) -> String {
    match approvals
        .iter()
        .find(|record| record.outcome == ApprovalOutcome::Rejected)
    {
        Some(rejection) => match &rejection.comment {
            Some(comment) => format!("vetoed by {}: {}", rejection.role, comment),
            None => format!("vetoed by {}", rejection.role),
        },
        None => format!(
            "policy {} is not satisfied by the current approvals",
            policy
        ),
    }
}

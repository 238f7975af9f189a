//! Campaign Core contract access.
//!
//! The Core contract receives contributions and settles milestones. As with
//! the token, the orchestration layer sees only the narrow
//! [`CampaignContract`] surface, so the flows can run against deterministic
//! fakes in tests.

use crate::error::{ClientError, Result};
use crate::types::CampaignStatus;
use crate::wallet::WalletMiddleware;
use async_trait::async_trait;
use ethers::prelude::abigen;
use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;

abigen!(
    CampaignCore,
    r#"[
        function contribute(uint256 campaignId, uint256 amount) external
        function submitEvidence(uint256 campaignId, uint256 milestoneId, bytes32 evidence) external
        function approveMilestone(uint256 campaignId, uint256 milestoneId) external
        function rejectMilestone(uint256 campaignId, uint256 milestoneId, string reason) external
        function releaseFunds(uint256 campaignId, uint256 milestoneId) external
        function campaignStatus(uint256 campaignId) external view returns (uint8)
    ]"#
);

/// Core contract surface required by the contribution and milestone flows
#[async_trait]
pub trait CampaignContract: Send + Sync {
    /// Submit a contribution of `amount` base units to a campaign
    async fn contribute(&self, campaign_id: U256, amount: U256) -> Result<TxHash>;

    /// Submit milestone evidence as a bare sha2-256 digest
    async fn submit_evidence(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        evidence: [u8; 32],
    ) -> Result<TxHash>;

    /// Record an on-chain approval for a milestone
    async fn approve_milestone(&self, campaign_id: U256, milestone_id: u64) -> Result<TxHash>;

    /// Record an on-chain rejection for a milestone
    async fn reject_milestone(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        reason: &str,
    ) -> Result<TxHash>;

    /// Release the milestone's funds to the developer
    async fn release_funds(&self, campaign_id: U256, milestone_id: u64) -> Result<TxHash>;

    /// Current lifecycle status of a campaign
    async fn campaign_status(&self, campaign_id: U256) -> Result<CampaignStatus>;
}

/// [`CampaignContract`] implementation over the deployed Core contract
#[derive(Clone)]
pub struct CampaignCoreClient {
    contract: CampaignCore<WalletMiddleware>,
}

impl CampaignCoreClient {
    /// Bind the Core contract at `core` through the signing middleware
    pub fn new(middleware: Arc<WalletMiddleware>, core: Address) -> Self {
        Self {
            contract: CampaignCore::new(core, middleware),
        }
    }

    /// Address of the bound Core contract
    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait]
impl CampaignContract for CampaignCoreClient {
    async fn contribute(&self, campaign_id: U256, amount: U256) -> Result<TxHash> {
        let call = self.contract.contribute(campaign_id, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("contribute submission: {}", e)))?;
        Ok(*pending)
    }

    async fn submit_evidence(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        evidence: [u8; 32],
    ) -> Result<TxHash> {
        let call = self
            .contract
            .submit_evidence(campaign_id, U256::from(milestone_id), evidence);
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("submitEvidence submission: {}", e)))?;
        Ok(*pending)
    }

    async fn approve_milestone(&self, campaign_id: U256, milestone_id: u64) -> Result<TxHash> {
        let call = self
            .contract
            .approve_milestone(campaign_id, U256::from(milestone_id));
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("approveMilestone submission: {}", e)))?;
        Ok(*pending)
    }

    async fn reject_milestone(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        reason: &str,
    ) -> Result<TxHash> {
        let call = self
            .contract
            .reject_milestone(campaign_id, U256::from(milestone_id), reason.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("rejectMilestone submission: {}", e)))?;
        Ok(*pending)
    }

    async fn release_funds(&self, campaign_id: U256, milestone_id: u64) -> Result<TxHash> {
        let call = self
            .contract
            .release_funds(campaign_id, U256::from(milestone_id));
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("releaseFunds submission: {}", e)))?;
        Ok(*pending)
    }

    async fn campaign_status(&self, campaign_id: U256) -> Result<CampaignStatus> {
        let code = self
            .contract
            .campaign_status(campaign_id)
            .call()
            .await
            .map_err(|e| ClientError::ChainError(format!("campaignStatus(): {}", e)))?;

        CampaignStatus::from_contract_code(code).ok_or_else(|| {
            ClientError::InvalidResponse(format!("unknown campaign status code {}", code))
        })
    }
}

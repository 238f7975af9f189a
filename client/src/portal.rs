//! Portal API client for bookkeeping and the milestone read model.
//!
//! The portal backend owns the off-chain records: contribution rows, the
//! per-milestone approval list and the campaign's policy string. This module
//! provides the HTTP client for those endpoints, with retry on transient
//! failures. Nothing here touches the chain.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::retry::RetryStrategy;
use crate::types::{ApprovalRecord, ContributionStatus};
use ethers::types::{Address, TxHash, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Portal API client
#[derive(Clone)]
pub struct PortalClient {
    /// HTTP client
    client: Client,
    /// Base URL for the portal API
    base_url: String,
    /// Retry strategy
    retry_strategy: RetryStrategy,
    /// Configuration
    #[allow(dead_code)]
    config: Arc<ClientConfig>,
}

/// Approval state of one milestone, as served by the read model
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneApprovals {
    /// Campaign's policy label, parsed by the caller
    pub policy: String,
    /// Decisions recorded so far
    pub approvals: Vec<ApprovalRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewContributionPayload<'a> {
    investor_address: String,
    campaign_id: String,
    amount: &'a str,
    transaction_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmContributionPayload {
    transaction_hash: String,
    status: ContributionStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneDecisionPayload<'a> {
    campaign_id: String,
    milestone_id: u64,
    approver_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    transaction_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvidencePayload<'a> {
    campaign_id: String,
    milestone_id: u64,
    evidence_cid: &'a str,
    transaction_hash: String,
}

impl PortalClient {
    /// Create a new portal client
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::NetworkError)?;

        let retry_strategy = RetryStrategy::from_config(&config);

        Ok(Self {
            client,
            base_url: config.portal_url.trim_end_matches('/').to_string(),
            retry_strategy,
            config,
        })
    }

    /// Record a submitted contribution, returning the bookkeeping id
    pub async fn record_contribution(
        &self,
        investor: Address,
        campaign_id: U256,
        amount: &str,
        tx_hash: TxHash,
    ) -> Result<String> {
        info!(
            "Recording contribution of {} to campaign {} ({:?})",
            amount, campaign_id, tx_hash
        );

        let url = format!("{}/api/investments", self.base_url);
        let payload = NewContributionPayload {
            investor_address: format!("{:?}", investor),
            campaign_id: campaign_id.to_string(),
            amount,
            transaction_hash: format!("{:?}", tx_hash),
        };

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .post(&url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(ClientError::NetworkError)?;

                let body = Self::check_response(response).await?;
                parse_record_id(&body)
            })
            .await
    }

    /// Flip a recorded contribution to CONFIRMED
    pub async fn confirm_contribution(&self, tx_hash: TxHash) -> Result<()> {
        info!("Confirming contribution {:?}", tx_hash);

        let url = format!("{}/api/investments", self.base_url);
        let payload = ConfirmContributionPayload {
            transaction_hash: format!("{:?}", tx_hash),
            status: ContributionStatus::Confirmed,
        };

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .patch(&url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(ClientError::NetworkError)?;

                Self::check_response(response).await?;
                Ok(())
            })
            .await
    }

    /// Fetch a milestone's policy label and recorded decisions
    pub async fn milestone_approvals(
        &self,
        campaign_id: U256,
        milestone_id: u64,
    ) -> Result<MilestoneApprovals> {
        debug!(
            "Fetching approvals for milestone {} of campaign {}",
            milestone_id, campaign_id
        );

        let url = format!("{}/api/milestones/approvals", self.base_url);
        let query = [
            ("campaignId", campaign_id.to_string()),
            ("milestoneId", milestone_id.to_string()),
        ];

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .get(&url)
                    .query(&query)
                    .send()
                    .await
                    .map_err(ClientError::NetworkError)?;

                let body = Self::check_response(response).await?;
                let approvals: MilestoneApprovals = serde_json::from_value(body)
                    .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
                debug!(
                    "Milestone has {} recorded decisions under policy {}",
                    approvals.approvals.len(),
                    approvals.policy
                );
                Ok(approvals)
            })
            .await
    }

    /// Record a mined milestone approval
    pub async fn record_milestone_approval(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        approver: Address,
        tx_hash: TxHash,
    ) -> Result<()> {
        info!(
            "Recording approval for milestone {} of campaign {}",
            milestone_id, campaign_id
        );

        let url = format!("{}/api/milestones/approve", self.base_url);
        let payload = MilestoneDecisionPayload {
            campaign_id: campaign_id.to_string(),
            milestone_id,
            approver_address: format!("{:?}", approver),
            reason: None,
            transaction_hash: format!("{:?}", tx_hash),
        };

        self.post_decision(&url, &payload).await
    }

    /// Record a mined milestone rejection with its reason
    pub async fn record_milestone_rejection(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        approver: Address,
        reason: &str,
        tx_hash: TxHash,
    ) -> Result<()> {
        info!(
            "Recording rejection for milestone {} of campaign {}",
            milestone_id, campaign_id
        );

        let url = format!("{}/api/milestones/reject", self.base_url);
        let payload = MilestoneDecisionPayload {
            campaign_id: campaign_id.to_string(),
            milestone_id,
            approver_address: format!("{:?}", approver),
            reason: Some(reason),
            transaction_hash: format!("{:?}", tx_hash),
        };

        self.post_decision(&url, &payload).await
    }

    /// Record mined milestone evidence
    pub async fn record_milestone_evidence(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        evidence_cid: &str,
        tx_hash: TxHash,
    ) -> Result<()> {
        info!(
            "Recording evidence for milestone {} of campaign {}",
            milestone_id, campaign_id
        );

        let url = format!("{}/api/milestones/evidence", self.base_url);
        let payload = EvidencePayload {
            campaign_id: campaign_id.to_string(),
            milestone_id,
            evidence_cid,
            transaction_hash: format!("{:?}", tx_hash),
        };

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .post(&url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(ClientError::NetworkError)?;

                Self::check_response(response).await?;
                Ok(())
            })
            .await
    }

    async fn post_decision(&self, url: &str, payload: &MilestoneDecisionPayload<'_>) -> Result<()> {
        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .post(url)
                    .json(payload)
                    .send()
                    .await
                    .map_err(ClientError::NetworkError)?;

                Self::check_response(response).await?;
                Ok(())
            })
            .await
    }

    /// Map a portal response to its JSON body or the appropriate error
    async fn check_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status.is_success() {
            if response.content_length() == Some(0) {
                return Ok(Value::Null);
            }
            return response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ClientError::RateLimitExceeded(retry_after));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::BookkeepingError(format!(
            "Status {}: {}",
            status, error_text
        )))
    }
}

/// Pull the bookkeeping id out of a record response
fn parse_record_id(body: &Value) -> Result<String> {
    match &body["id"] {
        Value::String(id) => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        _ => Err(ClientError::InvalidResponse(
            "Missing id field".to_string(),
        )),
    }
}

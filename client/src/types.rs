//! Common types used across the blockchain integration layer.
//!
//! This module defines the campaign, contribution, milestone and approval
//! vocabulary shared by the orchestrator, the coordinator and the portal
//! client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use ethers::types::{Address, TxHash, U256};

/// Transaction status as observed from the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Transaction is pending
    Pending,
    /// Transaction was mined successfully
    Success,
    /// Transaction reverted
    Failed,
    /// Transaction not found
    NotFound,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Success => write!(f, "SUCCESS"),
            TransactionStatus::Failed => write!(f, "FAILED"),
            TransactionStatus::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    /// Created but not yet open for contributions
    Draft,
    /// Open for contributions
    Collecting,
    /// Collection window closed below the soft cap
    SoftCapNotReached,
    /// Funded and executing milestones
    Executing,
    /// All milestones released
    Finalized,
    /// Cancelled by the issuer or the platform
    Cancelled,
    /// Contributions being returned
    Refunding,
}

impl CampaignStatus {
    /// Map the Core contract's numeric status code
    pub fn from_contract_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CampaignStatus::Draft),
            1 => Some(CampaignStatus::Collecting),
            2 => Some(CampaignStatus::Executing),
            3 => Some(CampaignStatus::Finalized),
            4 => Some(CampaignStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignStatus::Draft => write!(f, "DRAFT"),
            CampaignStatus::Collecting => write!(f, "COLLECTING"),
            CampaignStatus::SoftCapNotReached => write!(f, "SOFT_CAP_NOT_REACHED"),
            CampaignStatus::Executing => write!(f, "EXECUTING"),
            CampaignStatus::Finalized => write!(f, "FINALIZED"),
            CampaignStatus::Cancelled => write!(f, "CANCELLED"),
            CampaignStatus::Refunding => write!(f, "REFUNDING"),
        }
    }
}

/// Milestone review status, owned by the portal read model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Waiting for evidence
    Pending,
    /// Evidence submitted, approvals being collected
    InReview,
    /// Approval policy satisfied
    Approved,
    /// Vetoed by a rejection
    Rejected,
    /// Deadline passed without a decision
    Expired,
}

/// Bookkeeping status of a contribution record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionStatus {
    /// Recorded after submission, confirmation pending
    Pending,
    /// Confirmed on chain
    Confirmed,
}

/// Role of a milestone approver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
    /// Independent auditor
    Auditor,
    /// Campaign issuer
    Issuer,
    /// Project developer
    Developer,
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproverRole::Auditor => write!(f, "AUDITOR"),
            ApproverRole::Issuer => write!(f, "ISSUER"),
            ApproverRole::Developer => write!(f, "DEVELOPER"),
        }
    }
}

/// Outcome of an approver's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalOutcome {
    /// Approver signed off
    Approved,
    /// Approver vetoed
    Rejected,
}

/// Platform participant role, as registered on the Core contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    /// Contributes funds to campaigns
    Investor,
    /// Issues campaigns
    Issuer,
    /// Executes the project
    Developer,
    /// Reviews milestone evidence
    Auditor,
    /// Platform administrator
    Admin,
}

impl ParticipantRole {
    /// Map the Core contract's numeric role code
    pub fn from_contract_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ParticipantRole::Investor),
            1 => Some(ParticipantRole::Issuer),
            2 => Some(ParticipantRole::Developer),
            3 => Some(ParticipantRole::Auditor),
            4 => Some(ParticipantRole::Admin),
            _ => None,
        }
    }
}

/// One approver's recorded decision on a milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    /// Role of the approver
    pub role: ApproverRole,
    /// Approved or rejected
    pub outcome: ApprovalOutcome,
    /// Free-form comment; required for rejections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Hash of the on-chain decision transaction, if one was submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl ApprovalRecord {
    /// Shorthand for an approval without comment or transaction hash
    pub fn approved(role: ApproverRole) -> Self {
        Self {
            role,
            outcome: ApprovalOutcome::Approved,
            comment: None,
            transaction_hash: None,
        }
    }

    /// Shorthand for a rejection with a reason
    pub fn rejected(role: ApproverRole, reason: impl Into<String>) -> Self {
        Self {
            role,
            outcome: ApprovalOutcome::Rejected,
            comment: Some(reason.into()),
            transaction_hash: None,
        }
    }
}

/// Bookkeeping view of a contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    /// Address the contribution was sent from
    pub investor_address: String,
    /// Campaign the contribution belongs to
    pub campaign_id: String,
    /// Human-readable amount, as entered
    pub amount: String,
    /// Hash of the contribution transaction
    pub transaction_hash: String,
    /// Record status
    pub status: ContributionStatus,
    /// When the portal recorded the contribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Milestone as exposed by the portal read model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Sequence number within the campaign
    pub milestone_id: u64,
    /// Campaign the milestone belongs to
    pub campaign_id: String,
    /// Review status
    pub status: MilestoneStatus,
    /// Review deadline, if the campaign sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Latest submitted evidence CID, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_cid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_status_display() {
        assert_eq!(TransactionStatus::Pending.to_string(), "PENDING");
        assert_eq!(TransactionStatus::Success.to_string(), "SUCCESS");
        assert_eq!(TransactionStatus::Failed.to_string(), "FAILED");
        assert_eq!(TransactionStatus::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_campaign_status_contract_codes() {
        assert_eq!(
            CampaignStatus::from_contract_code(0),
            Some(CampaignStatus::Draft)
        );
        assert_eq!(
            CampaignStatus::from_contract_code(1),
            Some(CampaignStatus::Collecting)
        );
        assert_eq!(
            CampaignStatus::from_contract_code(4),
            Some(CampaignStatus::Cancelled)
        );
        assert_eq!(CampaignStatus::from_contract_code(9), None);
    }

    #[test]
    fn test_participant_role_contract_codes() {
        assert_eq!(
            ParticipantRole::from_contract_code(0),
            Some(ParticipantRole::Investor)
        );
        assert_eq!(
            ParticipantRole::from_contract_code(3),
            Some(ParticipantRole::Auditor)
        );
        assert_eq!(ParticipantRole::from_contract_code(5), None);
    }

    #[test]
    fn test_approver_role_serde() {
        let role = ApproverRole::Auditor;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"AUDITOR\"");

        let deserialized: ApproverRole = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, ApproverRole::Auditor);
    }

    #[test]
    fn test_milestone_status_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&MilestoneStatus::InReview).unwrap();
        assert_eq!(json, "\"IN_REVIEW\"");
    }

    #[test]
    fn test_approval_record_wire_shape() {
        let record = ApprovalRecord {
            role: ApproverRole::Issuer,
            outcome: ApprovalOutcome::Approved,
            comment: None,
            transaction_hash: Some("0xabc".to_string()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["role"], "ISSUER");
        assert_eq!(json["outcome"], "APPROVED");
        assert_eq!(json["transactionHash"], "0xabc");
        assert!(json.get("comment").is_none());
    }

    #[test]
    fn test_contribution_record_round_trip() {
        let record = ContributionRecord {
            investor_address: "0x1111111111111111111111111111111111111111".to_string(),
            campaign_id: "7".to_string(),
            amount: "150.5".to_string(),
            transaction_hash: "0xdeadbeef".to_string(),
            status: ContributionStatus::Pending,
            recorded_at: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"investorAddress\""));
        let deserialized: ContributionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.amount, "150.5");
        assert_eq!(deserialized.status, ContributionStatus::Pending);
    }
}

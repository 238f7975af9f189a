//! Milestone approval-policy evaluation.
//!
//! Each campaign fixes one approval policy at creation. Fund release is
//! gated on a pure evaluation of the milestone's recorded decisions against
//! that policy: any rejection vetoes outright, and only then does the policy
//! rule run. Policies form a closed set; strings the platform does not
//! recognize are rejected at the parse boundary rather than defaulting to
//! either outcome.

use crate::error::ClientError;
use crate::types::{ApprovalOutcome, ApprovalRecord, ApproverRole};
use std::fmt;
use std::str::FromStr;

/// Approval policy attached to a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Issuer and auditor must both approve
    IssuerAndAuditor,
    /// The auditor's approval alone suffices
    AuditorOnly,
    /// Any two approvals out of the three roles
    MajorityTwoOfThree,
}

impl ApprovalPolicy {
    /// Canonical wire label for this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalPolicy::IssuerAndAuditor => "ISSUER_AND_AUDITOR",
            ApprovalPolicy::AuditorOnly => "AUDITOR_ONLY",
            ApprovalPolicy::MajorityTwoOfThree => "MAJORITY_2_OF_3",
        }
    }
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalPolicy {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ISSUER_AND_AUDITOR" => Ok(ApprovalPolicy::IssuerAndAuditor),
            "AUDITOR_ONLY" => Ok(ApprovalPolicy::AuditorOnly),
            "MAJORITY_2_OF_3" => Ok(ApprovalPolicy::MajorityTwoOfThree),
            other => Err(ClientError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Decide whether a milestone's approval set authorizes fund release.
///
/// Pure and order-independent: the same records in any order produce the
/// same answer, and evaluation never mutates or records anything.
pub fn release_eligible(approvals: &[ApprovalRecord], policy: ApprovalPolicy) -> bool {
    // A single rejection vetoes regardless of policy
    if approvals
        .iter()
        .any(|record| record.outcome == ApprovalOutcome::Rejected)
    {
        return false;
    }

    let approved_by = |role: ApproverRole| {
        approvals
            .iter()
            .any(|record| record.role == role && record.outcome == ApprovalOutcome::Approved)
    };

    match policy {
        ApprovalPolicy::IssuerAndAuditor => {
            approved_by(ApproverRole::Issuer) && approved_by(ApproverRole::Auditor)
        }
        ApprovalPolicy::AuditorOnly => approved_by(ApproverRole::Auditor),
        ApprovalPolicy::MajorityTwoOfThree => {
            approvals
                .iter()
                .filter(|record| record.outcome == ApprovalOutcome::Approved)
                .count()
                >= 2
        }
    }
}

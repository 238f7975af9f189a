//! Error types for the blockchain integration layer.
//!
//! This module defines all error types that can occur during contribution and
//! milestone operations, including chain errors, portal API errors, and
//! validation errors.

use crate::amount::AmountError;
use crate::types::ApproverRole;
use thiserror::Error;

/// Main error type for investment-flow operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Human-readable amount could not be scaled to base units
    #[error("Invalid amount: {0}")]
    AmountParse(#[from] AmountError),

    /// Reading token metadata or allowance failed
    #[error("Token query failed: {0}")]
    TokenQueryError(String),

    /// The token approval transaction was rejected or reverted
    #[error("Token approval failed: {0}")]
    AuthorizationFailed(String),

    /// The contribution transaction was rejected or reverted
    #[error("Contribution failed: {0}")]
    ContributionFailed(String),

    /// The milestone fund release transaction was rejected or reverted
    #[error("Milestone release failed: {0}")]
    ReleaseFailed(String),

    /// Release requested for a milestone whose approval set does not satisfy the policy
    #[error("Release not authorized: {reason}")]
    ReleaseNotAuthorized {
        /// Why the approval set was judged insufficient
        reason: String,
    },

    /// Error communicating with the portal bookkeeping API
    #[error("Portal API error: {0}")]
    BookkeepingError(String),

    /// Campaign carries an approval policy this layer does not recognize
    #[error("Unknown approval policy: {0}")]
    UnknownPolicy(String),

    /// A role already has a recorded decision for this milestone
    #[error("Duplicate decision from role {role}")]
    DuplicateApproval {
        /// Role that already decided
        role: ApproverRole,
    },

    /// Evidence reference is not a valid IPFS CIDv0
    #[error("Invalid evidence CID: {0}")]
    InvalidCid(String),

    /// Connected wallet reports a different chain than the configured network
    #[error("Wrong network: expected chain id {expected}, wallet is on {actual}")]
    WrongNetwork {
        /// Chain id of the configured network
        expected: u64,
        /// Chain id the wallet provider reported
        actual: u64,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Error from the chain RPC provider
    #[error("Chain RPC error: {0}")]
    ChainError(String),

    /// Wallet rejected or failed a signing request
    #[error("Wallet error: {0}")]
    WalletError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimitExceeded(u64),

    /// Transaction not found (may still be propagating)
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Transaction was not mined within the configured window
    #[error("Transaction timeout after {0} seconds")]
    TransactionTimeout(u64),

    /// Max retries exceeded
    #[error("Max retries ({0}) exceeded")]
    MaxRetriesExceeded(usize),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

/// Result type alias for investment-flow operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Strip transport-level variants down to their message when a stage error
/// wraps them
pub(crate) fn stage_message(err: ClientError) -> String {
    match err {
        ClientError::ChainError(msg) | ClientError::WalletError(msg) => msg,
        other => other.to_string(),
    }
}

/// Error context for retryable operations
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Number of attempts made
    pub attempts: usize,
    /// Last error encountered
    pub last_error: String,
    /// Total time spent retrying (in milliseconds)
    pub total_time_ms: u64,
}

impl RetryContext {
    /// Create a new retry context
    pub fn new() -> Self {
        Self {
            attempts: 0,
            last_error: String::new(),
            total_time_ms: 0,
        }
    }

    /// Record an attempt
    pub fn record_attempt(&mut self, error: &str, duration_ms: u64) {
        self.attempts += 1;
        self.last_error = error.to_string();
        self.total_time_ms += duration_ms;
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::BookkeepingError("HTTP 500: boom".to_string());
        assert_eq!(err.to_string(), "Portal API error: HTTP 500: boom");
    }

    #[test]
    fn test_wrong_network_display() {
        let err = ClientError::WrongNetwork {
            expected: 137,
            actual: 1,
        };
        assert!(err.to_string().contains("137"));
        assert!(err.to_string().contains("1"));
    }

    #[test]
    fn test_amount_error_conversion() {
        let err: ClientError = AmountError::Zero.into();
        assert!(matches!(err, ClientError::AmountParse(AmountError::Zero)));
        assert!(err.to_string().starts_with("Invalid amount:"));
    }

    #[test]
    fn test_duplicate_approval_names_role() {
        let err = ClientError::DuplicateApproval {
            role: ApproverRole::Auditor,
        };
        assert!(err.to_string().contains("AUDITOR"));
    }

    #[test]
    fn test_stage_message_unwraps_transport_variants() {
        let msg = stage_message(ClientError::ChainError("user rejected".to_string()));
        assert_eq!(msg, "user rejected");

        let msg = stage_message(ClientError::WalletError("locked".to_string()));
        assert_eq!(msg, "locked");

        let msg = stage_message(ClientError::InvalidResponse("odd".to_string()));
        assert_eq!(msg, "Invalid response: odd");
    }

    #[test]
    fn test_retry_context() {
        let mut ctx = RetryContext::new();
        assert_eq!(ctx.attempts, 0);

        ctx.record_attempt("error 1", 100);
        assert_eq!(ctx.attempts, 1);
        assert_eq!(ctx.last_error, "error 1");
        assert_eq!(ctx.total_time_ms, 100);

        ctx.record_attempt("error 2", 200);
        assert_eq!(ctx.attempts, 2);
        assert_eq!(ctx.last_error, "error 2");
        assert_eq!(ctx.total_time_ms, 300);
    }
}

//! Transaction monitoring and status tracking.
//!
//! This module provides utilities for watching a submitted transaction until
//! it is mined, reverts, or exceeds the configured timeout. The orchestration
//! flows never proceed past a step whose transaction has not been observed
//! mined.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::TransactionStatus;
use crate::wallet::WalletProvider;
use ethers::types::TxHash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Transaction monitor for tracking transaction status
#[derive(Clone)]
pub struct TransactionMonitor {
    /// Wallet provider used for status lookups
    wallet: Arc<dyn WalletProvider>,
    /// Configuration
    config: Arc<ClientConfig>,
}

/// Monitoring options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Poll interval (in milliseconds)
    pub poll_interval_ms: u64,
    /// Timeout (in seconds)
    pub timeout_secs: u64,
}

impl MonitorOptions {
    /// Create from client config
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            poll_interval_ms: config.tx_poll_interval_ms,
            timeout_secs: config.tx_timeout_secs,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Transaction monitoring result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorResult {
    /// Transaction was mined successfully
    Mined,
    /// Transaction reverted
    Failed(String),
    /// Transaction was not observed mined within the timeout
    Timeout,
}

impl TransactionMonitor {
    /// Create a new transaction monitor
    pub fn new(wallet: Arc<dyn WalletProvider>, config: Arc<ClientConfig>) -> Self {
        Self { wallet, config }
    }

    /// Monitor a transaction until it completes or times out
    pub async fn monitor(&self, tx_hash: TxHash, options: MonitorOptions) -> Result<MonitorResult> {
        info!(
            "Monitoring transaction {:?} (timeout: {}s)",
            tx_hash, options.timeout_secs
        );

        let start = Instant::now();
        let timeout = Duration::from_secs(options.timeout_secs);
        let poll_interval = Duration::from_millis(options.poll_interval_ms);

        loop {
            // Check timeout
            if start.elapsed() >= timeout {
                warn!("Transaction monitoring timed out: {:?}", tx_hash);
                return Ok(MonitorResult::Timeout);
            }

            match self.wallet.transaction_status(tx_hash).await {
                Ok(TransactionStatus::Success) => {
                    info!("Transaction mined: {:?}", tx_hash);
                    return Ok(MonitorResult::Mined);
                }
                Ok(TransactionStatus::Failed) => {
                    warn!("Transaction reverted: {:?}", tx_hash);
                    return Ok(MonitorResult::Failed("transaction reverted".to_string()));
                }
                Ok(TransactionStatus::Pending) => {
                    debug!("Transaction still pending: {:?}", tx_hash);
                }
                Ok(TransactionStatus::NotFound) => {
                    debug!("Transaction not yet seen by the node: {:?}", tx_hash);
                }
                Err(e) => {
                    // Transient lookup failures keep polling until the timeout
                    debug!("Error fetching transaction status: {:?}", e);
                }
            }

            // Wait before next poll
            sleep(poll_interval).await;
        }
    }

    /// Monitor a transaction with the configured interval and timeout
    pub async fn wait_until_mined(&self, tx_hash: TxHash) -> Result<MonitorResult> {
        let options = MonitorOptions::from_config(&self.config);
        self.monitor(tx_hash, options).await
    }

    /// Get current transaction status (single check, no monitoring)
    pub async fn get_status(&self, tx_hash: TxHash) -> Result<TransactionStatus> {
        self.wallet.transaction_status(tx_hash).await
    }
}

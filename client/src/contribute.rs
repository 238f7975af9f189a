//! Contribution orchestration.
//!
//! This module sequences a user's "invest" action: resolve the token's
//! decimals, scale the amount exactly, top up the allowance only when it is
//! short, submit the contribution, and record the result with the portal.
//! Each step waits for the previous transaction to be observed mined before
//! the next one is submitted, and a failed step aborts everything after it.

use crate::amount;
use crate::campaign::CampaignContract;
use crate::config::ClientConfig;
use crate::erc20::TokenContract;
use crate::error::{stage_message, ClientError, Result};
use crate::monitor::{MonitorResult, TransactionMonitor};
use crate::portal::PortalClient;
use crate::wallet::WalletProvider;
use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fate of the portal bookkeeping write after a mined contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookkeepingOutcome {
    /// Portal accepted the record
    Recorded {
        /// Bookkeeping id assigned by the portal
        id: String,
    },
    /// Portal write failed; the contribution itself still succeeded
    Failed {
        /// Why the record could not be written
        reason: String,
    },
}

/// Outcome of a completed contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionReceipt {
    /// Approval transaction, absent when the existing allowance sufficed
    pub approve_tx_hash: Option<TxHash>,
    /// The mined contribution transaction
    pub contribute_tx_hash: TxHash,
    /// Whether the portal recorded the contribution
    pub bookkeeping: BookkeepingOutcome,
}

/// Sequences the approve-then-contribute flow against the chain and portal
#[derive(Clone)]
pub struct ContributionOrchestrator {
    /// Wallet provider (investor address, transaction status)
    wallet: Arc<dyn WalletProvider>,
    /// Stablecoin contract
    token: Arc<dyn TokenContract>,
    /// Campaign Core contract
    campaign: Arc<dyn CampaignContract>,
    /// Portal bookkeeping client
    portal: PortalClient,
    /// Transaction monitor
    monitor: TransactionMonitor,
    /// Configuration
    config: Arc<ClientConfig>,
    /// Serializes contributions so the allowance check-then-act cannot
    /// interleave between concurrent calls in this process
    sequence: Arc<Mutex<()>>,
}

impl ContributionOrchestrator {
    /// Create a new contribution orchestrator
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        token: Arc<dyn TokenContract>,
        campaign: Arc<dyn CampaignContract>,
        portal: PortalClient,
        monitor: TransactionMonitor,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            wallet,
            token,
            campaign,
            portal,
            monitor,
            config,
            sequence: Arc::new(Mutex::new(())),
        }
    }

    /// Contribute `amount` (a human-readable decimal string) to a campaign.
    ///
    /// On success the receipt tells the whole story: whether an approval was
    /// needed, the contribution transaction, and whether the portal recorded
    /// it. A failed portal write after a mined contribution is reported in
    /// the receipt, never as an error.
    pub async fn contribute(&self, campaign_id: U256, amount: &str) -> Result<ContributionReceipt> {
        let _serialized = self.sequence.lock().await;

        // Reject zero and malformed input before anything leaves the process
        amount::validate_format(amount)?;

        info!(
            "Starting contribution of {} to campaign {}",
            amount, campaign_id
        );

        let investor = self.wallet.investor_address().await?;
        let spender = self.config.contracts.core;

        let decimals = self.token.decimals().await?;
        let base_units = amount::to_base_units(amount, decimals)?;
        debug!(
            "Scaled {} to {} base units ({} decimals)",
            amount, base_units, decimals
        );

        let approve_tx_hash = self
            .ensure_allowance(investor, spender, base_units)
            .await?;

        let contribute_tx_hash = self
            .campaign
            .contribute(campaign_id, base_units)
            .await
            .map_err(|e| ClientError::ContributionFailed(stage_message(e)))?;
        info!("Contribution submitted: {:?}", contribute_tx_hash);

        match self.monitor.wait_until_mined(contribute_tx_hash).await? {
            MonitorResult::Mined => {}
            MonitorResult::Failed(reason) => {
                return Err(ClientError::ContributionFailed(reason));
            }
            MonitorResult::Timeout => {
                return Err(ClientError::ContributionFailed(format!(
                    "transaction {:?} not mined within {}s",
                    contribute_tx_hash, self.config.tx_timeout_secs
                )));
            }
        }

        // Best effort from here on: the contribution is on chain and no
        // portal failure may turn it into an error
        let bookkeeping = match self
            .portal
            .record_contribution(investor, campaign_id, amount, contribute_tx_hash)
            .await
        {
            Ok(id) => BookkeepingOutcome::Recorded { id },
            Err(e) => {
                warn!(
                    "Contribution {:?} mined but bookkeeping failed: {}",
                    contribute_tx_hash, e
                );
                BookkeepingOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ContributionReceipt {
            approve_tx_hash,
            contribute_tx_hash,
            bookkeeping,
        })
    }

    /// Flip a recorded contribution to CONFIRMED in the portal
    pub async fn confirm_contribution(&self, tx_hash: TxHash) -> Result<()> {
        self.portal.confirm_contribution(tx_hash).await
    }

    /// Approve the spender for exactly `required` base units unless the
    /// current allowance already covers it.
    async fn ensure_allowance(
        &self,
        owner: Address,
        spender: Address,
        required: U256,
    ) -> Result<Option<TxHash>> {
        let current = self.token.allowance(owner, spender).await?;

        if current >= required {
            info!(
                "Allowance {} already covers {}; skipping approval",
                current, required
            );
            return Ok(None);
        }

        let tx_hash = self
            .token
            .approve(spender, required)
            .await
            .map_err(|e| ClientError::AuthorizationFailed(stage_message(e)))?;
        info!("Approval submitted: {:?}", tx_hash);

        match self.monitor.wait_until_mined(tx_hash).await? {
            MonitorResult::Mined => Ok(Some(tx_hash)),
            MonitorResult::Failed(reason) => Err(ClientError::AuthorizationFailed(reason)),
            MonitorResult::Timeout => Err(ClientError::AuthorizationFailed(format!(
                "transaction {:?} not mined within {}s",
                tx_hash, self.config.tx_timeout_secs
            ))),
        }
    }
}

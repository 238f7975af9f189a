//! BrickChain Blockchain Integration Layer
//!
//! This library is the client-side integration layer of the BrickChain
//! real-estate tokenization portal. It sequences stablecoin contributions to
//! campaign contracts, coordinates milestone evidence and approver decisions,
//! and gates fund release on the campaign's approval policy, keeping the
//! portal's bookkeeping in step with the chain along the way.
//!
//! # Features
//!
//! - **Contribution Orchestration**: decimals-aware amount scaling,
//!   allowance-gated ERC-20 approval, contribution submission and portal
//!   bookkeeping in a single call
//! - **Milestone Flows**: evidence submission by IPFS CID, approver decisions
//!   with duplicate protection, and policy-gated fund release
//! - **Approval Policies**: `ISSUER_AND_AUDITOR`, `AUDITOR_ONLY` and
//!   `MAJORITY_2_OF_3` evaluation, with any rejection acting as a veto
//! - **Transaction Monitoring**: receipt polling with configurable
//!   confirmations and timeouts
//! - **Error Handling**: stage-attributed error types with detailed messages
//! - **Retry Logic**: exponential backoff for transient portal errors
//! - **Network Support**: Ethereum, Polygon, Base, Arbitrum and custom
//!   networks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brickchain_client::{ClientConfig, ContractAddresses, InvestmentClient};
//! use ethers::signers::LocalWallet;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize tracing
//!     tracing_subscriber::fmt::init();
//!
//!     // Deployed contract addresses for the target network
//!     let contracts = ContractAddresses {
//!         core: "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse()?,
//!         token: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse()?,
//!     };
//!
//!     // Create configuration for Polygon
//!     let config = Arc::new(ClientConfig::polygon("https://portal.example.com", contracts));
//!
//!     // Connect with the investor's signing key
//!     let signer: LocalWallet = std::env::var("PRIVATE_KEY")?.parse()?;
//!     let client = InvestmentClient::connect(config, signer).await?;
//!
//!     // Contribute 250.75 stablecoin units to campaign 1
//!     let receipt = client.contribute(1u64.into(), "250.75").await?;
//!     println!("Contribution mined: {:?}", receipt.contribute_tx_hash);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Examples
//!
//! ## Release a milestone
//!
//! ```rust,no_run
//! use brickchain_client::{ClientConfig, ContractAddresses, InvestmentClient};
//! use ethers::signers::LocalWallet;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let contracts = ContractAddresses {
//! #     core: "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse()?,
//! #     token: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse()?,
//! # };
//! # let config = Arc::new(ClientConfig::polygon("https://portal.example.com", contracts));
//! # let signer: LocalWallet = std::env::var("PRIVATE_KEY")?.parse()?;
//! let client = InvestmentClient::connect(config, signer).await?;
//!
//! // Refused with ReleaseNotAuthorized if the approval policy is not satisfied
//! let receipt = client.release_milestone(3u64.into(), 1).await?;
//! println!("Funds released: {:?}", receipt.tx_hash);
//! # Ok(())
//! # }
//! ```
//!
//! ## Check a milestone's approvals
//!
//! ```rust,no_run
//! use brickchain_client::{ClientConfig, ContractAddresses, InvestmentClient};
//! use ethers::signers::LocalWallet;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let contracts = ContractAddresses {
//! #     core: "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse()?,
//! #     token: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse()?,
//! # };
//! # let config = Arc::new(ClientConfig::polygon("https://portal.example.com", contracts));
//! # let signer: LocalWallet = std::env::var("PRIVATE_KEY")?.parse()?;
//! let client = InvestmentClient::connect(config, signer).await?;
//!
//! let state = client.milestone_approvals(3u64.into(), 1).await?;
//! println!("Policy {} with {} recorded decisions", state.policy, state.approvals.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

// Re-export main types and modules
pub mod amount;
pub mod campaign;
pub mod cid;
pub mod config;
pub mod contribute;
pub mod erc20;
pub mod error;
pub mod milestones;
pub mod monitor;
pub mod policy;
pub mod portal;
pub mod retry;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use amount::AmountError;
pub use campaign::{CampaignContract, CampaignCoreClient};
pub use config::{ClientConfig, ContractAddresses, Network};
pub use contribute::{BookkeepingOutcome, ContributionOrchestrator, ContributionReceipt};
pub use erc20::{Erc20Client, TokenContract};
pub use error::{ClientError, Result};
pub use milestones::{DecisionReceipt, EvidenceReceipt, MilestoneCoordinator, ReleaseReceipt};
pub use monitor::{MonitorOptions, MonitorResult, TransactionMonitor};
pub use policy::{release_eligible, ApprovalPolicy};
pub use portal::{MilestoneApprovals, PortalClient};
pub use retry::RetryStrategy;
pub use types::{
    Address, ApprovalOutcome, ApprovalRecord, ApproverRole, CampaignStatus, ContributionRecord,
    ContributionStatus, Milestone, MilestoneStatus, ParticipantRole, TransactionStatus, TxHash,
    U256,
};
pub use wallet::{EthersWallet, WalletMiddleware, WalletProvider};

use ethers::signers::LocalWallet;
use std::sync::Arc;
use tracing::info;

/// Main investment client that combines the wallet, contract bindings,
/// portal API, contribution orchestration and milestone coordination into a
/// single unified interface.
///
/// This is the primary entry point for interacting with a BrickChain
/// deployment.
#[derive(Clone)]
pub struct InvestmentClient {
    /// Wallet bound to the configured network
    wallet: Arc<EthersWallet>,
    /// Contribution orchestrator
    orchestrator: ContributionOrchestrator,
    /// Milestone coordinator
    coordinator: MilestoneCoordinator,
    /// Campaign Core contract client
    campaign: Arc<dyn CampaignContract>,
    /// Portal API client
    portal: PortalClient,
    /// Transaction monitor
    monitor: TransactionMonitor,
    /// Configuration
    config: Arc<ClientConfig>,
}

impl InvestmentClient {
    /// Connect to the configured network and portal.
    ///
    /// Validates the configuration, binds the signer to the RPC endpoint and
    /// refuses to proceed if the endpoint reports a different chain id than
    /// the configuration expects.
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `signer` - The investor's or approver's signing key
    pub async fn connect(config: Arc<ClientConfig>, signer: LocalWallet) -> Result<Self> {
        // Validate configuration
        config.validate()?;

        info!(
            "Initializing investment client for network: {:?}",
            config.network
        );

        let wallet = Arc::new(EthersWallet::connect(&config, signer).await?);
        let middleware = wallet.middleware();

        let token: Arc<dyn TokenContract> =
            Arc::new(Erc20Client::new(middleware.clone(), config.contracts.token));
        let campaign: Arc<dyn CampaignContract> =
            Arc::new(CampaignCoreClient::new(middleware, config.contracts.core));
        let portal = PortalClient::new(config.clone())?;
        let monitor = TransactionMonitor::new(wallet.clone(), config.clone());

        let orchestrator = ContributionOrchestrator::new(
            wallet.clone(),
            token,
            campaign.clone(),
            portal.clone(),
            monitor.clone(),
            config.clone(),
        );
        let coordinator = MilestoneCoordinator::new(
            wallet.clone(),
            campaign.clone(),
            portal.clone(),
            monitor.clone(),
            config.clone(),
        );

        Ok(Self {
            wallet,
            orchestrator,
            coordinator,
            campaign,
            portal,
            monitor,
            config,
        })
    }

    /// Address of the connected signer
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Get the wallet
    pub fn wallet(&self) -> &EthersWallet {
        &self.wallet
    }

    /// Get the portal client
    pub fn portal(&self) -> &PortalClient {
        &self.portal
    }

    /// Get the transaction monitor
    pub fn transaction_monitor(&self) -> &TransactionMonitor {
        &self.monitor
    }

    /// Contribute a human-readable stablecoin amount to a campaign
    pub async fn contribute(&self, campaign_id: U256, amount: &str) -> Result<ContributionReceipt> {
        self.orchestrator.contribute(campaign_id, amount).await
    }

    /// Flip a recorded contribution to CONFIRMED in the portal
    pub async fn confirm_contribution(&self, tx_hash: TxHash) -> Result<()> {
        self.orchestrator.confirm_contribution(tx_hash).await
    }

    /// Submit milestone evidence referenced by an IPFS CIDv0
    pub async fn submit_evidence(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        evidence_cid: &str,
    ) -> Result<EvidenceReceipt> {
        self.coordinator
            .submit_evidence(campaign_id, milestone_id, evidence_cid)
            .await
    }

    /// Record an approval for a milestone as `role`
    pub async fn approve_milestone(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        role: ApproverRole,
    ) -> Result<DecisionReceipt> {
        self.coordinator
            .record_approval(campaign_id, milestone_id, role)
            .await
    }

    /// Record a rejection for a milestone as `role`, with a reason
    pub async fn reject_milestone(
        &self,
        campaign_id: U256,
        milestone_id: u64,
        role: ApproverRole,
        reason: &str,
    ) -> Result<DecisionReceipt> {
        self.coordinator
            .record_rejection(campaign_id, milestone_id, role, reason)
            .await
    }

    /// Release a milestone's funds once its approval policy is satisfied
    pub async fn release_milestone(
        &self,
        campaign_id: U256,
        milestone_id: u64,
    ) -> Result<ReleaseReceipt> {
        self.coordinator.release(campaign_id, milestone_id).await
    }

    /// Current approval state of a milestone, from the portal read model
    pub async fn milestone_approvals(
        &self,
        campaign_id: U256,
        milestone_id: u64,
    ) -> Result<MilestoneApprovals> {
        self.portal
            .milestone_approvals(campaign_id, milestone_id)
            .await
    }

    /// Current status of a campaign, read from the Core contract
    pub async fn campaign_status(&self, campaign_id: U256) -> Result<CampaignStatus> {
        self.campaign.campaign_status(campaign_id).await
    }

    /// Status of a transaction by hash
    pub async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus> {
        self.wallet.transaction_status(tx_hash).await
    }

    /// Monitor a transaction until completion
    pub async fn monitor_transaction(
        &self,
        tx_hash: TxHash,
        options: MonitorOptions,
    ) -> Result<MonitorResult> {
        self.monitor.monitor(tx_hash, options).await
    }

    /// Get configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

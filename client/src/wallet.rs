//! Wallet provider abstraction and the ethers signer implementation.
//!
//! The orchestration layer never talks to a signing backend directly; it goes
//! through [`WalletProvider`], which supplies the investor address and
//! transaction status lookups. The production implementation wraps an ethers
//! [`SignerMiddleware`] and verifies at connect time that the RPC endpoint is
//! on the configured chain.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::TransactionStatus;
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TransactionReceipt, TxHash, U64};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Concrete middleware stack used for signing and submitting transactions
pub type WalletMiddleware = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signing backend as seen by the orchestration layer
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Address contributions and decisions are signed with
    async fn investor_address(&self) -> Result<Address>;

    /// Chain id the backend is connected to
    async fn chain_id(&self) -> Result<u64>;

    /// Current status of a submitted transaction
    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus>;
}

/// Wallet provider backed by an ethers HTTP provider and a local signer
#[derive(Clone, Debug)]
pub struct EthersWallet {
    client: Arc<WalletMiddleware>,
    address: Address,
    chain_id: u64,
    confirmations: u64,
}

impl EthersWallet {
    /// Connect to the configured RPC endpoint and verify its chain id.
    ///
    /// Refuses to proceed when the endpoint reports a chain other than the
    /// configured one, so a signer for the wrong network can never submit.
    pub async fn connect(config: &ClientConfig, signer: LocalWallet) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?
            .interval(Duration::from_millis(config.tx_poll_interval_ms));

        let reported = provider
            .get_chainid()
            .await
            .map_err(|e| ClientError::ChainError(format!("failed to read chain id: {}", e)))?
            .as_u64();

        if reported != config.chain_id {
            return Err(ClientError::WrongNetwork {
                expected: config.chain_id,
                actual: reported,
            });
        }

        let signer = signer.with_chain_id(reported);
        let address = signer.address();
        info!(
            "Connected wallet {:?} to {} (chain id {})",
            address,
            config.network.display_name(),
            reported
        );

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, signer)),
            address,
            chain_id: reported,
            confirmations: config.confirmations,
        })
    }

    /// Middleware handle for constructing contract bindings
    pub fn middleware(&self) -> Arc<WalletMiddleware> {
        self.client.clone()
    }

    /// Address of the connected signer
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletProvider for EthersWallet {
    async fn investor_address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TransactionStatus> {
        let receipt = self
            .client
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ClientError::ChainError(format!("receipt lookup failed: {}", e)))?;

        let receipt = match receipt {
            Some(receipt) => receipt,
            None => {
                // No receipt yet: pending if the node knows the transaction
                let known = self
                    .client
                    .get_transaction(tx_hash)
                    .await
                    .map_err(|e| ClientError::ChainError(format!("tx lookup failed: {}", e)))?;
                return Ok(match known {
                    Some(_) => TransactionStatus::Pending,
                    None => TransactionStatus::NotFound,
                });
            }
        };

        if classify_receipt(&receipt) == TransactionStatus::Failed {
            return Ok(TransactionStatus::Failed);
        }

        if self.confirmations > 1 {
            let mined_in = match receipt.block_number {
                Some(block) => block,
                None => return Ok(TransactionStatus::Pending),
            };
            let current = self
                .client
                .get_block_number()
                .await
                .map_err(|e| ClientError::ChainError(format!("block lookup failed: {}", e)))?;
            if !enough_confirmations(mined_in, current, self.confirmations) {
                debug!(
                    "Transaction {:?} mined in {} awaiting confirmations at {}",
                    tx_hash, mined_in, current
                );
                return Ok(TransactionStatus::Pending);
            }
        }

        Ok(TransactionStatus::Success)
    }
}

/// Map a mined receipt to success or revert
fn classify_receipt(receipt: &TransactionReceipt) -> TransactionStatus {
    match receipt.status {
        Some(code) if code.as_u64() == 1 => TransactionStatus::Success,
        _ => TransactionStatus::Failed,
    }
}

/// A transaction in block N has one confirmation once N is the head
fn enough_confirmations(mined_in: U64, current: U64, required: u64) -> bool {
    current.as_u64().saturating_sub(mined_in.as_u64()) + 1 >= required
}

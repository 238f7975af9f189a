//! ERC-20 stablecoin access.
//!
//! Contributions are denominated in the campaign's stablecoin. The
//! orchestrator needs exactly three things from it: the declared decimals,
//! the current allowance granted to the Core contract, and the ability to
//! submit an approval. [`TokenContract`] captures that surface;
//! [`Erc20Client`] implements it over an ethers binding.

use crate::error::{ClientError, Result};
use crate::wallet::WalletMiddleware;
use async_trait::async_trait;
use ethers::prelude::abigen;
use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;
use tracing::debug;

abigen!(
    Erc20Token,
    r#"[
        function decimals() external view returns (uint8)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);

/// Token surface required by the contribution flow
#[async_trait]
pub trait TokenContract: Send + Sync {
    /// Decimals the token reports; never guessed or cached across calls
    async fn decimals(&self) -> Result<u8>;

    /// Base units `spender` may currently move on behalf of `owner`
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Submit an approval for exactly `amount` base units, returning the
    /// transaction hash without waiting for inclusion
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash>;
}

/// [`TokenContract`] implementation over the deployed ERC-20
#[derive(Clone)]
pub struct Erc20Client {
    contract: Erc20Token<WalletMiddleware>,
}

impl Erc20Client {
    /// Bind the token contract at `token` through the signing middleware
    pub fn new(middleware: Arc<WalletMiddleware>, token: Address) -> Self {
        Self {
            contract: Erc20Token::new(token, middleware),
        }
    }

    /// Address of the bound token contract
    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait]
impl TokenContract for Erc20Client {
    async fn decimals(&self) -> Result<u8> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ClientError::TokenQueryError(format!("decimals(): {}", e)))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let allowance = self
            .contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ClientError::TokenQueryError(format!("allowance(): {}", e)))?;
        debug!(
            "Allowance for {:?} towards {:?}: {}",
            owner, spender, allowance
        );
        Ok(allowance)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash> {
        let call = self.contract.approve(spender, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::ChainError(format!("approve submission: {}", e)))?;
        Ok(*pending)
    }
}

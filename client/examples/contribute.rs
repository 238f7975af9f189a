//! Example: Contribute to a campaign
//!
//! This example walks the full contribution flow: amount scaling, allowance
//! check, ERC-20 approval when needed, the contribution itself and the portal
//! bookkeeping record.
//!
//! Required environment variables: RPC_URL, PRIVATE_KEY, CORE_ADDRESS,
//! TOKEN_ADDRESS.

use brickchain_client::{
    BookkeepingOutcome, ClientConfig, ContractAddresses, InvestmentClient, U256,
};
use ethers::signers::LocalWallet;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("brickchain_client=info")
        .init();

    println!("=== BrickChain Contribution Example ===\n");

    // Deployed contract addresses
    let contracts = ContractAddresses {
        core: std::env::var("CORE_ADDRESS")?.parse()?,
        token: std::env::var("TOKEN_ADDRESS")?.parse()?,
    };

    // Create configuration for Polygon
    let config = Arc::new(
        ClientConfig::polygon("https://portal.example.com", contracts)
            .with_rpc_url(std::env::var("RPC_URL")?),
    );
    println!("Network: {:?}", config.network);
    println!("RPC URL: {}", config.rpc_url);
    println!("Portal URL: {}\n", config.portal_url);

    // Connect with the investor's signing key
    let signer: LocalWallet = std::env::var("PRIVATE_KEY")?.parse()?;
    let client = InvestmentClient::connect(config, signer).await?;
    println!("✓ Connected as {:?}\n", client.address());

    // Contribute to campaign 1
    let campaign_id: U256 = 1u64.into();
    let amount = "250.75";
    println!("Contributing {} to campaign {}...", amount, campaign_id);

    match client.contribute(campaign_id, amount).await {
        Ok(receipt) => {
            println!("✓ Contribution mined!");
            match receipt.approve_tx_hash {
                Some(hash) => println!("  - Approval: {:?}", hash),
                None => println!("  - Approval: skipped, allowance already covers the amount"),
            }
            println!("  - Contribution: {:?}", receipt.contribute_tx_hash);
            match &receipt.bookkeeping {
                BookkeepingOutcome::Recorded { id } => {
                    println!("  - Portal record: {}", id);
                }
                BookkeepingOutcome::Failed { reason } => {
                    println!("  - Portal record failed: {}", reason);
                    println!("    The contribution is on chain; re-record it later.");
                }
            }

            // Flip the portal record to CONFIRMED
            println!("\nConfirming the portal record...");
            match client.confirm_contribution(receipt.contribute_tx_hash).await {
                Ok(()) => println!("✓ Portal record confirmed"),
                Err(e) => eprintln!("✗ Confirmation failed: {}", e),
            }
        }
        Err(e) => {
            eprintln!("✗ Contribution failed: {}", e);
            return Err(e.into());
        }
    }

    println!("\nExample completed!");
    Ok(())
}

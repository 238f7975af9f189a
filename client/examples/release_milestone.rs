//! Example: Milestone approval state and fund release
//!
//! This example reads a milestone's approval state from the portal, shows how
//! the campaign's policy evaluates it, and attempts a release. An ineligible
//! milestone is refused locally without submitting a transaction.
//!
//! Required environment variables: RPC_URL, PRIVATE_KEY, CORE_ADDRESS,
//! TOKEN_ADDRESS.

use brickchain_client::{
    release_eligible, ApprovalPolicy, ClientConfig, ClientError, ContractAddresses,
    InvestmentClient, U256,
};
use ethers::signers::LocalWallet;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("brickchain_client=debug")
        .init();

    println!("=== Milestone Release Example ===\n");

    let contracts = ContractAddresses {
        core: std::env::var("CORE_ADDRESS")?.parse()?,
        token: std::env::var("TOKEN_ADDRESS")?.parse()?,
    };
    let config = Arc::new(
        ClientConfig::polygon("https://portal.example.com", contracts)
            .with_rpc_url(std::env::var("RPC_URL")?),
    );

    let signer: LocalWallet = std::env::var("PRIVATE_KEY")?.parse()?;
    let client = InvestmentClient::connect(config, signer).await?;
    println!("✓ Connected as {:?}\n", client.address());

    let campaign_id: U256 = 3u64.into();
    let milestone_id = 1u64;

    // Read the approval state from the portal
    println!(
        "Fetching approvals for milestone {} of campaign {}...",
        milestone_id, campaign_id
    );
    let state = client.milestone_approvals(campaign_id, milestone_id).await?;
    let policy: ApprovalPolicy = state.policy.parse()?;
    println!("✓ Policy: {}", policy);
    for record in &state.approvals {
        match &record.comment {
            Some(comment) => println!("  - {} {:?}: {}", record.role, record.outcome, comment),
            None => println!("  - {} {:?}", record.role, record.outcome),
        }
    }
    println!(
        "  Eligible for release: {}\n",
        release_eligible(&state.approvals, policy)
    );

    // Attempt the release
    println!("Releasing funds...");
    match client.release_milestone(campaign_id, milestone_id).await {
        Ok(receipt) => {
            println!("✓ Funds released: {:?}", receipt.tx_hash);
        }
        Err(ClientError::ReleaseNotAuthorized { reason }) => {
            println!("✗ Release refused before submission: {}", reason);
        }
        Err(e) => {
            eprintln!("✗ Release failed: {}", e);
            return Err(e.into());
        }
    }

    println!("\nExample completed!");
    Ok(())
}

//! Bidding.

use anyhow::Result;
use bidhall_core::Config;
use tracing::debug;

use super::{gateway, with_spinner};
use crate::ui;

/// Bid command arguments.
#[derive(Debug, Clone)]
pub struct BidArgs {
    /// Listing ID.
    pub id: String,
    /// Amount as typed.
    pub amount: String,
}

/// Run the bid command.
pub async fn run_bid(config: &Config, args: BidArgs) -> Result<()> {
    let gateway = gateway(config)?;

    let listing = with_spinner("Loading listing...", gateway.listing(&args.id)).await?;
    with_spinner("Placing bid...", gateway.place_bid(&listing, &args.amount)).await?;

    ui::success(&format!(
        "Bid of {} placed on '{}'",
        ui::credits(args.amount.trim().parse().unwrap_or_default()),
        listing.display_title()
    ));

    // Credits changed; refresh the cached user when possible.
    match gateway.my_profile().await {
        Ok(profile) => ui::kv("Credits", &format!("{} credits", profile.credits)),
        Err(e) => debug!(error = %e, "Could not refresh profile after bid"),
    }
    Ok(())
}

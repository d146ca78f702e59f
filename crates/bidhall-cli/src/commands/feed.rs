//! Listing feed.

use anyhow::Result;
use bidhall_core::auction::{highest_bid, search};
use bidhall_core::{Config, Listing};
use chrono::Utc;

use super::{gateway, with_spinner};
use crate::ui;

/// Feed command arguments.
#[derive(Debug, Clone, Default)]
pub struct FeedArgs {
    /// Filter by title, description or seller.
    pub search: Option<String>,
}

/// Run the feed command.
pub async fn run_feed(config: &Config, args: FeedArgs) -> Result<()> {
    let gateway = gateway(config)?;
    let listings = with_spinner("Loading listings...", gateway.feed()).await?;

    let term = args.search.unwrap_or_default();
    let found = search(&listings, &term);

    if found.is_empty() {
        if term.trim().is_empty() {
            ui::info("No listings yet.");
        } else {
            ui::info(&format!("No listings match '{}'.", term.trim()));
        }
        return Ok(());
    }

    ui::header(&format!("Listings ({})", found.len()));
    print_listings(&found);
    Ok(())
}

/// Print listings as a table.
pub fn print_listings(listings: &[&Listing]) {
    let now = Utc::now();
    ui::table_row(&[
        ("TITLE", 34),
        ("SELLER", 18),
        ("BIDS", 6),
        ("HIGHEST", 16),
        ("ENDS", 14),
        ("ID", 0),
    ]);

    for listing in listings {
        let title = ui::truncate(listing.display_title(), 32);
        let seller = ui::truncate(listing.seller_name(), 16);
        let bids = listing.bid_count().to_string();
        let highest = ui::credits(highest_bid(&listing.bids));
        let ends = ui::time_left(listing.ends_at, now);
        ui::table_row(&[
            (title.as_str(), 34),
            (seller.as_str(), 18),
            (bids.as_str(), 6),
            (highest.as_str(), 16),
            (ends.as_str(), 14),
            (listing.id.as_str(), 0),
        ]);
    }
}

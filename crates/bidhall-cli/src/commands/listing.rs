//! Listing detail, create, edit and delete.

use anyhow::Result;
use bidhall_core::auction::{bids_newest_first, highest_bid, is_seller};
use bidhall_core::validation::{ListingForm, ListingUpdateForm};
use bidhall_core::{Config, Listing};
use chrono::Utc;

use super::{gateway, with_spinner};
use crate::ui::{self, prompts};

/// Listing subcommand.
#[derive(Debug, Clone)]
pub enum ListingAction {
    /// Show one listing with its bid history.
    Show {
        /// Listing ID.
        id: String,
    },
    /// Create a listing.
    Create(ListingFields),
    /// Edit a listing's title, description and image.
    Edit {
        /// Listing ID.
        id: String,
        /// New values.
        fields: ListingFields,
    },
    /// Delete a listing.
    Delete {
        /// Listing ID.
        id: String,
        /// Skip the confirmation prompt.
        yes: bool,
    },
}

/// Listing fields given on the command line. Missing ones are prompted for.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    /// Image URL.
    pub media_url: Option<String>,
    /// Image alt text.
    pub media_alt: Option<String>,
    /// End date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// End time, `HH:MM`.
    pub end_time: Option<String>,
}

/// Listing command arguments.
#[derive(Debug, Clone)]
pub struct ListingArgs {
    /// What to do.
    pub action: ListingAction,
}

/// Run the listing command.
pub async fn run_listing(config: &Config, args: ListingArgs) -> Result<()> {
    match args.action {
        ListingAction::Show { id } => show(config, &id).await,
        ListingAction::Create(fields) => create(config, fields).await,
        ListingAction::Edit { id, fields } => edit(config, &id, fields).await,
        ListingAction::Delete { id, yes } => delete(config, &id, yes).await,
    }
}

async fn show(config: &Config, id: &str) -> Result<()> {
    let gateway = gateway(config)?;
    let listing = with_spinner("Loading listing...", gateway.listing(id)).await?;
    let session = gateway.session().await?;

    print_listing(&listing);

    match session.user().filter(|_| session.is_logged_in()) {
        Some(user) if is_seller(&listing, &user.name) => {
            ui::dim(&format!(
                "You are the seller. Edit with 'bidhall listing edit {}'.",
                listing.id
            ));
        }
        Some(_) => {
            ui::dim(&format!(
                "Place a bid with 'bidhall bid {} <amount>'.",
                listing.id
            ));
        }
        None => ui::dim("Log in to place a bid."),
    }
    Ok(())
}

fn print_listing(listing: &Listing) {
    ui::header(listing.display_title());
    ui::kv("ID", &listing.id);
    ui::kv("Seller", listing.seller_name());
    if let Some(description) = listing.description.as_deref().filter(|d| !d.is_empty()) {
        ui::kv("Description", description);
    }
    if !listing.tags.is_empty() {
        ui::kv("Tags", &listing.tags.join(", "));
    }
    if let Some(media) = listing.media.first() {
        ui::kv("Image", &media.url);
    }
    ui::kv("Created", &ui::date(listing.created));
    ui::kv(
        "Ends",
        &format!(
            "{} ({})",
            ui::date(listing.ends_at),
            ui::time_left(listing.ends_at, Utc::now())
        ),
    );
    ui::kv("Highest bid", &ui::credits(highest_bid(&listing.bids)));

    ui::header(&format!("Bids ({})", listing.bid_count()));
    if listing.bids.is_empty() {
        ui::dim("No bids yet.");
        return;
    }
    for bid in bids_newest_first(&listing.bids) {
        let amount = bid.amount.map_or_else(|| "-".to_string(), ui::credits);
        let placed = ui::date(bid.created);
        ui::table_row(&[
            (bid.bidder_name().unwrap_or("Unknown bidder"), 20),
            (amount.as_str(), 16),
            (placed.as_str(), 0),
        ]);
    }
}

async fn create(config: &Config, fields: ListingFields) -> Result<()> {
    let gateway = gateway(config)?;

    let form = ListingForm {
        title: prompts::or_input(fields.title, "Title")?,
        description: prompts::or_optional(fields.description, "Description")?,
        tags: prompts::or_optional(fields.tags, "Tags (comma separated)")?,
        media_url: prompts::or_optional(fields.media_url, "Image URL")?,
        media_alt: prompts::or_optional(fields.media_alt, "Image alt text")?,
        end_date: prompts::or_input(fields.end_date, "End date (YYYY-MM-DD)")?,
        end_time: prompts::or_input(fields.end_time, "End time (HH:MM)")?,
    };

    let created = with_spinner(
        "Creating listing...",
        gateway.create_listing(&form, Utc::now()),
    )
    .await?;

    match created {
        Some(listing) => {
            ui::success(&format!("Created '{}'", listing.display_title()));
            ui::kv("ID", &listing.id);
        }
        None => ui::success("Listing created"),
    }
    Ok(())
}

async fn edit(config: &Config, id: &str, fields: ListingFields) -> Result<()> {
    let gateway = gateway(config)?;
    let current = with_spinner("Loading listing...", gateway.listing(id)).await?;

    let title = match fields.title {
        Some(t) => t,
        None => prompts::input_with_default("Title", &current.title)?,
    };
    let description = match fields.description {
        Some(d) => d,
        None => prompts::input_with_default(
            "Description",
            current.description.as_deref().unwrap_or(""),
        )?,
    };
    let form = ListingUpdateForm {
        title,
        description,
        media_url: prompts::or_optional(fields.media_url, "New image URL (blank keeps current)")?,
        media_alt: fields.media_alt.unwrap_or_default(),
    };

    let updated = with_spinner("Saving listing...", gateway.update_listing(id, &form)).await?;
    ui::success(&format!("Updated '{}'", updated.display_title()));
    Ok(())
}

async fn delete(config: &Config, id: &str, yes: bool) -> Result<()> {
    let gateway = gateway(config)?;

    if !yes && !prompts::confirm(&format!("Delete listing {id}?"))? {
        ui::info("Delete cancelled");
        return Ok(());
    }

    with_spinner("Deleting listing...", gateway.delete_listing(id)).await?;
    ui::success("Listing deleted");
    Ok(())
}

//! The logged-in user's profile and bid history.

use anyhow::Result;
use bidhall_core::Config;
use bidhall_core::types::media_url;
use bidhall_core::validation::ProfileUpdateForm;
use chrono::Utc;

use super::{gateway, with_spinner};
use crate::ui::{self, prompts};

/// Profile subcommand.
#[derive(Debug, Clone)]
pub enum ProfileAction {
    /// Show the profile.
    Show,
    /// Update bio, avatar and banner.
    Update(ProfileFields),
    /// Listings the user has bid on.
    Bids,
}

/// Profile fields given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    /// New bio.
    pub bio: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
    /// Avatar alt text.
    pub avatar_alt: Option<String>,
    /// New banner URL.
    pub banner: Option<String>,
    /// Banner alt text.
    pub banner_alt: Option<String>,
}

/// Profile command arguments.
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    /// What to do.
    pub action: ProfileAction,
}

/// Run the profile command.
pub async fn run_profile(config: &Config, args: ProfileArgs) -> Result<()> {
    match args.action {
        ProfileAction::Show => show(config).await,
        ProfileAction::Update(fields) => update(config, fields).await,
        ProfileAction::Bids => bids(config).await,
    }
}

async fn show(config: &Config) -> Result<()> {
    let gateway = gateway(config)?;
    let profile = with_spinner("Loading profile...", gateway.my_profile()).await?;

    ui::header(&profile.name);
    if let Some(email) = &profile.email {
        ui::kv("Email", email);
    }
    ui::kv("Credits", &format!("{} credits", profile.credits));
    ui::kv("Bio", profile.bio.as_deref().filter(|b| !b.is_empty()).unwrap_or("-"));
    ui::kv("Avatar", media_url(profile.avatar.as_ref(), "-"));
    ui::kv("Banner", media_url(profile.banner.as_ref(), "-"));
    if let Some(count) = profile.count {
        ui::kv("Wins", &count.wins.to_string());
    }

    ui::header(&format!("Listings ({})", profile.listings.len()));
    if profile.listings.is_empty() {
        ui::dim("No listings yet.");
    }
    let now = Utc::now();
    for listing in &profile.listings {
        let title = ui::truncate(listing.display_title(), 32);
        let ends = ui::time_left(listing.ends_at, now);
        ui::table_row(&[
            (title.as_str(), 34),
            (ends.as_str(), 14),
            (listing.id.as_str(), 0),
        ]);
    }
    Ok(())
}

async fn update(config: &Config, fields: ProfileFields) -> Result<()> {
    let gateway = gateway(config)?;
    let current = with_spinner("Loading profile...", gateway.my_profile()).await?;

    let bio = match fields.bio {
        Some(b) => b,
        None => prompts::input_with_default("Bio", current.bio.as_deref().unwrap_or(""))?,
    };
    let avatar_url = prompts::or_optional(fields.avatar, "Avatar URL (blank keeps current)")?;
    let banner_url = prompts::or_optional(fields.banner, "Banner URL (blank keeps current)")?;

    let form = ProfileUpdateForm {
        bio,
        avatar_url,
        avatar_alt: fields.avatar_alt.unwrap_or_default(),
        banner_url,
        banner_alt: fields.banner_alt.unwrap_or_default(),
    };

    with_spinner("Saving profile...", gateway.update_profile(&current, &form)).await?;
    ui::success("Profile updated");
    Ok(())
}

async fn bids(config: &Config) -> Result<()> {
    let gateway = gateway(config)?;
    let session = gateway.session().await?;
    if !session.is_logged_in() {
        ui::info("Not logged in. Run 'bidhall login' to see your bids.");
        return Ok(());
    }

    let activity = with_spinner("Loading bids...", gateway.bid_activity()).await?;
    if activity.is_empty() {
        ui::info("You have not bid on any listings yet.");
        return Ok(());
    }

    ui::header(&format!("My bids ({})", activity.len()));
    ui::table_row(&[
        ("TITLE", 34),
        ("MY BID", 16),
        ("HIGHEST", 16),
        ("STATUS", 10),
        ("ENDS", 0),
    ]);
    let now = Utc::now();
    for entry in &activity {
        let title = ui::truncate(entry.listing.display_title(), 32);
        let mine = ui::credits(entry.my_highest);
        let highest = ui::credits(entry.highest);
        let status = if entry.my_highest >= entry.highest {
            "Leading"
        } else {
            "Outbid"
        };
        let ends = ui::time_left(entry.listing.ends_at, now);
        ui::table_row(&[
            (title.as_str(), 34),
            (mine.as_str(), 16),
            (highest.as_str(), 16),
            (status, 10),
            (ends.as_str(), 0),
        ]);
    }
    Ok(())
}

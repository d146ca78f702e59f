//! Bidhall CLI - command-line client for the Noroff student auction house.

mod commands;
mod ui;

use bidhall_client::ApiError;
use bidhall_core::Config;
use bidhall_core::config::{GlobalSettings, LogFormat};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::auth::{LoginArgs, RegisterArgs};
use commands::bid::BidArgs;
use commands::config::{ConfigAction, ConfigArgs};
use commands::feed::FeedArgs;
use commands::listing::{ListingAction, ListingArgs, ListingFields};
use commands::profile::{ProfileAction, ProfileArgs, ProfileFields};

#[derive(Parser)]
#[command(name = "bidhall")]
#[command(about = "Bidhall - the Noroff student auction house")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a student account
    Login {
        /// Student email (@stud.noroff.no)
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted for when absent)
        #[arg(long, env = "BIDHALL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Register a new student account
    Register {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// Student email (@stud.noroff.no)
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted for twice when absent)
        #[arg(long, env = "BIDHALL_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,

        /// Banner image URL
        #[arg(long)]
        banner: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse the newest listings
    Feed {
        /// Filter by title, description or seller
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Listing operations
    Listing {
        #[command(subcommand)]
        action: ListingCommands,
    },

    /// Bid on a listing
    Bid {
        /// Listing ID
        id: String,

        /// Amount in credits
        amount: String,
    },

    /// Your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommands>,
    },

    /// Configuration get/set
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(clap::Args)]
struct ListingFieldArgs {
    /// Title
    #[arg(long)]
    title: Option<String>,

    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Image URL
    #[arg(long)]
    media_url: Option<String>,

    /// Image alt text
    #[arg(long)]
    media_alt: Option<String>,
}

#[derive(Subcommand)]
enum ListingCommands {
    /// Show a listing and its bids
    Show {
        /// Listing ID
        id: String,
    },

    /// Create a listing
    Create {
        #[command(flatten)]
        fields: ListingFieldArgs,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// End date (YYYY-MM-DD, local time)
        #[arg(long)]
        end_date: Option<String>,

        /// End time (HH:MM, local time)
        #[arg(long)]
        end_time: Option<String>,
    },

    /// Edit one of your listings
    Edit {
        /// Listing ID
        id: String,

        #[command(flatten)]
        fields: ListingFieldArgs,
    },

    /// Delete one of your listings
    Delete {
        /// Listing ID
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile and listings
    Show,

    /// Update bio, avatar or banner
    Update {
        /// New bio
        #[arg(long)]
        bio: Option<String>,

        /// New avatar URL
        #[arg(long)]
        avatar: Option<String>,

        /// Avatar alt text
        #[arg(long)]
        avatar_alt: Option<String>,

        /// New banner URL
        #[arg(long)]
        banner: Option<String>,

        /// Banner alt text
        #[arg(long)]
        banner_alt: Option<String>,
    },

    /// Listings you have bid on
    Bids,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., api.baseUrl)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.baseUrl)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show full configuration
    Show,

    /// Validate configuration
    Validate,
}

impl ListingFieldArgs {
    fn into_fields(self) -> ListingFields {
        ListingFields {
            title: self.title,
            description: self.description,
            media_url: self.media_url,
            media_alt: self.media_alt,
            ..ListingFields::default()
        }
    }
}

fn init_logging(verbose: bool, settings: &GlobalSettings) {
    let level = if verbose || settings.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (pretty, json) = match settings.log_format {
        LogFormat::Pretty => (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::load_default();
    let settings = config
        .as_ref()
        .map(|c| c.settings.clone())
        .unwrap_or_default();
    init_logging(cli.verbose, &settings);

    let verbose = cli.verbose;
    if let Err(e) = run(cli, config).await {
        match e.downcast_ref::<ApiError>() {
            Some(api) if verbose => ui::error(&api.detail()),
            _ => ui::error(&format!("{e:#}")),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Result<Config, bidhall_core::ConfigError>) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        ui::info("Welcome to Bidhall!");
        ui::info("Run 'bidhall login' to get started, or 'bidhall --help' for all commands.");
        return Ok(());
    };

    // Config commands must work even when the file does not load.
    let config = match (&command, config) {
        (Commands::Config { .. }, config) => config.unwrap_or_default(),
        (_, config) => config?,
    };

    match command {
        Commands::Login { email, password } => {
            commands::run_login(&config, LoginArgs { email, password }).await?;
        }

        Commands::Register {
            name,
            email,
            password,
            avatar,
            banner,
        } => {
            let args = RegisterArgs {
                name,
                email,
                password,
                avatar,
                banner,
            };
            commands::run_register(&config, args).await?;
        }

        Commands::Logout => commands::run_logout(&config).await?,

        Commands::Whoami => commands::run_whoami(&config).await?,

        Commands::Feed { search } => {
            commands::run_feed(&config, FeedArgs { search }).await?;
        }

        Commands::Listing { action } => {
            let action = match action {
                ListingCommands::Show { id } => ListingAction::Show { id },
                ListingCommands::Create {
                    fields,
                    tags,
                    end_date,
                    end_time,
                } => ListingAction::Create(ListingFields {
                    tags,
                    end_date,
                    end_time,
                    ..fields.into_fields()
                }),
                ListingCommands::Edit { id, fields } => ListingAction::Edit {
                    id,
                    fields: fields.into_fields(),
                },
                ListingCommands::Delete { id, yes } => ListingAction::Delete { id, yes },
            };
            commands::run_listing(&config, ListingArgs { action }).await?;
        }

        Commands::Bid { id, amount } => {
            commands::run_bid(&config, BidArgs { id, amount }).await?;
        }

        Commands::Profile { action } => {
            let action = match action {
                Some(ProfileCommands::Show) | None => ProfileAction::Show,
                Some(ProfileCommands::Update {
                    bio,
                    avatar,
                    avatar_alt,
                    banner,
                    banner_alt,
                }) => ProfileAction::Update(ProfileFields {
                    bio,
                    avatar,
                    avatar_alt,
                    banner,
                    banner_alt,
                }),
                Some(ProfileCommands::Bids) => ProfileAction::Bids,
            };
            commands::run_profile(&config, ProfileArgs { action }).await?;
        }

        Commands::Config { action } => {
            let action = match action {
                Some(ConfigCommands::Get { key }) => ConfigAction::Get(key),
                Some(ConfigCommands::Set { key, value }) => ConfigAction::Set { key, value },
                Some(ConfigCommands::Validate) => ConfigAction::Validate,
                Some(ConfigCommands::Show) | None => ConfigAction::Show,
            };
            commands::run_config(ConfigArgs { action })?;
        }
    }

    Ok(())
}

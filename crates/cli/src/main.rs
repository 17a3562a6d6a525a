//! Sol City CLI - Browse and manage the Sol City Portal from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Start a Discord sign-in and check who is signed in
//! sol-city auth login
//! SOL_CITY_ACCESS_TOKEN=... sol-city auth whoami
//!
//! # Browse the directory
//! sol-city directory --category "Food & Drink" --query coffee
//!
//! # Owner edits and reviews
//! sol-city business edit <id> --phone "(555) 472-6311"
//! sol-city review add <id> --rating 4 --comment "Great food"
//!
//! # Admin content
//! sol-city news create --title "Fair" --content "Opens Saturday"
//! sol-city events list
//! ```
//!
//! # Commands
//!
//! - `auth` - Sign in, sign out, show the current identity
//! - `directory`, `board`, `properties` - Filtered listings
//! - `business`, `review` - Business page actions
//! - `news`, `events` - Admin content workflow
//! - `footer`, `whisper` - The hidden page

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sol_city_portal::config::ConfigError;
use sol_city_portal::storage::StorageError;
use sol_city_portal::{PortalConfig, PortalError, telemetry};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "sol-city")]
#[command(author, version, about = "Sol City Portal from the command line")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Business directory
    Directory {
        /// Category filter
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Free-text search over name and description
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Business page
    Business {
        #[command(subcommand)]
        action: BusinessAction,
    },
    /// Business reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// News posts (admin only)
    News {
        #[command(subcommand)]
        action: NewsAction,
    },
    /// Events (admin only)
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Community bulletin board
    Board {
        /// Category filter
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Free-text search over title, content and tags
        #[arg(short, long, default_value = "")]
        query: String,

        /// Board data file (default: the posts bundled with this binary)
        #[arg(long, env = "SOL_CITY_BOARD_PATH")]
        file: Option<PathBuf>,
    },
    /// Real-estate listings
    Properties {
        /// Search over title, neighborhood and street
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Click the mayor's office number in the footer
    Footer {
        /// Number of clicks
        #[arg(short, long, default_value_t = 1)]
        clicks: u32,

        /// Durable storage file
        #[arg(long, env = "SOL_CITY_STORAGE_PATH", default_value = ".sol-city/storage.json")]
        storage: PathBuf,
    },
    /// Open the hidden page
    Whisper {
        /// Durable storage file
        #[arg(long, env = "SOL_CITY_STORAGE_PATH", default_value = ".sol-city/storage.json")]
        storage: PathBuf,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Print the OAuth sign-in URL
    Login,
    /// End the current session
    Logout,
    /// Show the signed-in identity and privilege
    Whoami,
}

#[derive(Subcommand)]
enum BusinessAction {
    /// Show a business with its reviews
    Show {
        /// Business ID
        id: String,
    },
    /// Edit a business you own
    Edit {
        /// Business ID
        id: String,

        #[command(flatten)]
        fields: commands::business::EditFields,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Review a business
    Add {
        /// Business ID
        business_id: String,

        /// Stars, 1 to 5
        #[arg(short, long, default_value_t = 5)]
        rating: i64,

        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },
}

#[derive(Subcommand)]
enum NewsAction {
    /// List news posts, newest first
    List {
        /// Show at most this many
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Publish a news post
    Create {
        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        content: String,

        #[arg(short, long, default_value = "")]
        excerpt: String,
    },
    /// Delete a news post
    Delete {
        /// News post ID
        id: String,
    },
}

#[derive(Subcommand)]
enum EventAction {
    /// List events, soonest first
    List {
        /// Show at most this many
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Create an event
    Create {
        #[arg(short, long, default_value = "")]
        title: String,

        /// RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`
        #[arg(short = 'D', long, default_value = "")]
        date: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "")]
        location: String,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
}

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    fn report(&self) {
        match self {
            Self::Portal(e) => e.report(),
            _ => tracing::error!(error = %self, "Command failed"),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Portal(e) => e.user_message(),
            _ => self.to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Local commands run without backend configuration
    let config = PortalConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(telemetry::init_sentry);
    telemetry::init_tracing(cli.json_logs);

    if let Err(e) = run(cli.command, config).await {
        e.report();
        output::error(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Result<PortalConfig, ConfigError>) -> Result<(), CliError> {
    match command {
        Commands::Footer { clicks, storage } => commands::whisper::footer(&storage, clicks).await,
        Commands::Whisper { storage } => commands::whisper::open(&storage).await,
        Commands::Board {
            category,
            query,
            file,
        } => commands::listings::board(file.as_deref(), &category, &query).await,
        command => {
            let config = config?;
            let state = sol_city_portal::PortalState::connect(&config).await?;
            run_connected(command, &state).await
        }
    }
}

async fn run_connected(command: Commands, state: &sol_city_portal::PortalState) -> Result<(), CliError> {
    match command {
        Commands::Auth { action } => match action {
            AuthAction::Login => commands::auth::login(state).await,
            AuthAction::Logout => commands::auth::logout(state).await,
            AuthAction::Whoami => commands::auth::whoami(state).await,
        },
        Commands::Directory { category, query } => {
            commands::listings::directory(state, &category, &query).await
        }
        Commands::Properties { query } => commands::listings::properties(state, &query).await,
        Commands::Business { action } => match action {
            BusinessAction::Show { id } => commands::business::show(state, &id).await,
            BusinessAction::Edit { id, fields } => commands::business::edit(state, &id, fields).await,
        },
        Commands::Review { action } => match action {
            ReviewAction::Add {
                business_id,
                rating,
                comment,
            } => commands::business::review(state, &business_id, rating, comment).await,
        },
        Commands::News { action } => match action {
            NewsAction::List { limit } => commands::content::list_news(state, limit).await,
            NewsAction::Create {
                title,
                content,
                excerpt,
            } => commands::content::create_news(state, title, content, excerpt).await,
            NewsAction::Delete { id } => commands::content::delete_news(state, &id).await,
        },
        Commands::Events { action } => match action {
            EventAction::List { limit } => commands::content::list_events(state, limit).await,
            EventAction::Create {
                title,
                date,
                description,
                location,
            } => {
                let draft = sol_city_core::records::EventDraft {
                    title,
                    description,
                    location,
                    event_date: date,
                };
                commands::content::create_event(state, draft).await
            }
            EventAction::Delete { id } => commands::content::delete_event(state, &id).await,
        },
        // Handled in `run` without a backend
        Commands::Footer { .. } | Commands::Whisper { .. } | Commands::Board { .. } => Ok(()),
    }
}

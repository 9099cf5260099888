//! `roster`: browse the console's student, bill and center lists from a terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine_logging::engine_info;
use log::LevelFilter;
use roster_core::{parse_filter_assignment, Resource};
use roster_engine::{ApiContext, EngineConfig, EngineHandle};

mod platform;

use platform::app::{run_browse, BrowseOptions};
use platform::config::{ConsoleConfig, DEFAULT_CONFIG_FILENAME};
use platform::persistence::{Session, SessionStore};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Infinite-scrolling lists for the admin console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token for later requests
    Login {
        #[arg(long)]
        token: String,

        /// Sign in as a center user, scoping lists to this center
        #[arg(long)]
        center_id: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show who is signed in
    Status,

    /// Browse a list: students, bills or centers
    Browse {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Filter as name=value; may be repeated
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Rows per page
        #[arg(short = 'l', long)]
        page_size: Option<u32>,
    },
}

fn parse_resource(raw: &str) -> Result<Resource, String> {
    raw.parse().map_err(|err: roster_core::ValidationError| err.to_string())
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    parse_filter_assignment(raw).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::load(&cli.config)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(config.log, level, &config.log_file);
    engine_info!("Loaded configuration from {:?}", cli.config);

    let sessions = SessionStore::new(&config.session_file);
    match cli.command {
        Commands::Login { token, center_id } => {
            let session = Session::new(token, center_id);
            sessions.save(&session)?;
            println!(
                "Signed in as {:?}; session saved to {:?}",
                session.role,
                sessions.path()
            );
        }
        Commands::Logout => {
            if sessions.clear()? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Commands::Status => match sessions.load()? {
            Some(session) => {
                print!("Signed in as {:?}", session.role);
                if let Some(center_id) = &session.center_id {
                    print!(" for center {center_id}");
                }
                println!(" since {}", session.saved_at.format("%Y-%m-%d %H:%M UTC"));
            }
            None => println!("Not signed in"),
        },
        Commands::Browse {
            resource,
            search,
            mut filters,
            page_size,
        } => {
            if let Some(search) = search {
                filters.push(("search".to_string(), search));
            }
            let mut context = ApiContext::new(&config.base_url)
                .with_context(|| format!("invalid base_url {:?}", config.base_url))?;
            match sessions.load_or_warn() {
                Some(session) => context = session.apply(context),
                None => eprintln!("Not signed in; requests are sent without a token."),
            }
            let engine = EngineHandle::new(EngineConfig {
                settings: config.fetch_settings(),
                retry: config.retry_policy(),
                context,
            })?;
            run_browse(
                &config,
                engine,
                BrowseOptions {
                    resource,
                    filters,
                    page_size,
                },
            )?;
        }
    }
    Ok(())
}

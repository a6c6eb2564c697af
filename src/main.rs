//! Lecture Organizer CLI application
//!
//! Command-line interface for staging video playlists as chaptered courses
//! and keeping lecture order in sync with the course backend.

use std::process;

use tracing::{error, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use lecture_organizer::cli::{handle_import, handle_move, handle_reorder, handle_tags, Cli, Commands};
use lecture_organizer::config::AppConfig;
use lecture_organizer::errors::{AppError, Result};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("{} error: {}", e.category(), e);
        eprintln!("Error: {}", e.user_message());
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;
    init_logging(&cli, &config)?;

    info!("Lecture Organizer v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Import(args) => {
            info!("Executing import command");
            handle_import(args, &config).await
        }
        Commands::Reorder(args) => {
            info!("Executing reorder command");
            handle_reorder(args, &config).await
        }
        Commands::Move(args) => {
            info!("Executing move command");
            handle_move(args, &config).await
        }
        Commands::Tags(args) => {
            info!("Executing tags command");
            handle_tags(args, &config).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Without any verbosity flag the configured level applies.
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let global = &cli.global;
    let log_level = if global.quiet || global.verbose || global.very_verbose {
        cli.log_level().to_string()
    } else {
        config.logging.level.clone()
    };

    let directive = format!("lecture_organizer={}", log_level)
        .parse::<Directive>()
        .map_err(|e| AppError::generic(format!("Invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}

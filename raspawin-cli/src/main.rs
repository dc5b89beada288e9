mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use raspawin_core::{Money, SqliteStore};
use raspawin_game::GameError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raspawin")]
#[command(about = "RaspaWin - scratch cards in the terminal")]
#[command(version)]
struct Cli {
    /// Data directory for the game database and config
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Tenant (operator) the player belongs to
    #[arg(short, long, global = true)]
    tenant: Option<String>,

    /// Player id
    #[arg(short, long, global = true)]
    player: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Buy and scratch a card
    Play {
        /// Scratch random strokes until the card reveals itself
        #[arg(long)]
        auto: bool,
        /// Seed for the prize draw and auto strokes
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the player's balance
    Balance,
    /// Show the last completed games
    History,
    /// Show win statistics over the recent history
    Stats,
    /// Inspect or edit the tenant's prize catalog
    #[command(subcommand)]
    Catalog(commands::CatalogCommands),
    /// Draw many prizes from the catalog and compare with the configured odds
    Simulate {
        /// Number of draws
        #[arg(short, long, default_value_t = 100_000)]
        rounds: u64,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reset the player's balance and history to the defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Start from this balance instead of the configured one, e.g. 250.00
        #[arg(long)]
        balance: Option<Money>,
    },
    /// Show or write the configuration file
    #[command(subcommand)]
    Config(commands::ConfigCommands),
}

/// Everything a command needs, passed explicitly.
pub struct AppContext {
    pub config: CliConfig,
    pub store: Arc<SqliteStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "raspawin={},raspawin_game={},raspawin_core={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let mut config = CliConfig::load(&data_dir);
    if let Some(tenant) = cli.tenant {
        config.tenant_id = tenant;
    }
    if let Some(player) = cli.player {
        config.player_id = player;
    }
    config.game.validate()?;

    let store = Arc::new(SqliteStore::new(&config.db_path()).await?);
    let ctx = AppContext { config, store };

    // Execute command
    let result = match cli.command {
        Commands::Play { auto, seed } => commands::play(&ctx, auto, seed).await,
        Commands::Balance => commands::show_balance(&ctx).await,
        Commands::History => commands::show_history(&ctx).await,
        Commands::Stats => commands::show_stats(&ctx).await,
        Commands::Catalog(cmd) => commands::handle_catalog_command(cmd, &ctx).await,
        Commands::Simulate { rounds, seed } => commands::simulate(&ctx, rounds, seed).await,
        Commands::Reset { yes, balance } => commands::reset_player(&ctx, yes, balance).await,
        Commands::Config(cmd) => commands::handle_config_command(cmd, &ctx),
    };

    if let Err(e) = result {
        match e.downcast_ref::<GameError>() {
            Some(GameError::InsufficientFunds { need, available }) => {
                eprintln!("Error: Insufficient funds");
                eprintln!("Need: {}, Available: {}", need, available);
                eprintln!("Use 'raspawin reset' to start over with the default balance");
            }
            Some(GameError::InvalidCatalog(reason)) => {
                eprintln!("Error: The prize catalog cannot be played: {}", reason);
                eprintln!("Use 'raspawin catalog show' to review it");
            }
            Some(GameError::PrizeNotFound(id)) => {
                eprintln!("Error: No prize with id '{}'", id);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_balance_is_parsed_as_money() {
        let cli = Cli::try_parse_from(["raspawin", "reset", "--yes", "--balance", "250.5"]).unwrap();
        match cli.command {
            Commands::Reset { yes, balance } => {
                assert!(yes);
                assert_eq!(balance, Some(Money::from_cents(25_050)));
            }
            _ => panic!("expected reset"),
        }

        assert!(Cli::try_parse_from(["raspawin", "reset", "--balance", "2.505"]).is_err());
        assert!(Cli::try_parse_from(["raspawin", "reset", "--balance", "-1"]).is_err());
    }
}

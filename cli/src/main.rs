//! ParkNexus operator CLI
//!
//! ```sh
//! # Validate the config (~/.config/parknexus/config.toml by default)
//! parknexus check
//!
//! # Create or upgrade the database schema
//! parknexus migrate
//!
//! # Price a stay without touching storage
//! parknexus quote --class VIP --minutes 90
//!
//! # Print a config file with every default filled in
//! parknexus init > config.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use parknexus_engine::config::AppConfig;
use parknexus_engine::domain::SpotClass;
use parknexus_engine::infrastructure::{init_database, run_migrations, DatabaseConfig};
use parknexus_engine::runtime::init_tracing;
use parknexus_engine::FeeCalculator;

/// ParkNexus: parking spot occupancy and reservation engine.
#[derive(Parser, Debug)]
#[command(
    name = "parknexus",
    version,
    about = "Operator tooling for the ParkNexus parking engine",
    long_about = "Operator tooling for the ParkNexus parking engine.\n\n\
                  Default config: ~/.config/parknexus/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKNEXUS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file and exit.
    Check,

    /// Apply pending database migrations.
    Migrate {
        /// Database URL; defaults to `database.url` from the config.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },

    /// Compute the fee for a stay.
    Quote {
        /// Spot class (STANDARD or VIP).
        #[arg(long, default_value = "STANDARD")]
        class: String,

        /// Length of the stay in minutes.
        #[arg(long)]
        minutes: i64,
    },

    /// Print the effective configuration as TOML.
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(parknexus_engine::default_config_path);

    let mut config = match AppConfig::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid config {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    match cli.command {
        Command::Check => {
            println!("Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Database    : {}", config.database.url);
            println!("   Currency    : {}", config.pricing.currency);
            println!(
                "   Rates       : STANDARD {}/hr, VIP {}/hr, minimum {}",
                config.pricing.standard_hourly_rate,
                config.pricing.vip_hourly_rate,
                config.pricing.minimum_fee
            );
            println!("   Log level   : {}", config.logging.level);
        }
        Command::Migrate { database_url } => {
            let mut db_config = DatabaseConfig::from(&config.database);
            if let Some(url) = database_url {
                db_config.url = url;
            }
            let db = init_database(&db_config).await?;
            if let Err(e) = run_migrations(&db).await {
                error!("Migration failed: {}", e);
                return Err(e.into());
            }
            println!("Migrations applied to {}", db_config.url);
        }
        Command::Quote { class, minutes } => {
            if minutes < 0 {
                return Err("minutes must not be negative".into());
            }
            let fees = FeeCalculator::new(config.pricing.clone());
            let quote = fees.quote(minutes, SpotClass::from_str_lossy(&class));
            println!("{} ({})", quote.summary, quote.currency);
        }
        Command::Init => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use prosroster::config::AppConfig;
use prosroster::fetch::HttpFetcher;
use prosroster::roster::RosterCache;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prosroster", about = "Lead prosecuting attorney roster scraper")]
struct Cli {
    /// Optional TOML config overriding the built-in jurisdiction directory
    /// and fetch settings.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and print the roster for one jurisdiction code (e.g. us, ma, tx)
    Roster {
        code: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the configured jurisdictions
    Jurisdictions,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Roster { code, json } => {
            if let Some(name) = config.display_name(&code) {
                info!(%code, name, "requesting roster");
            }

            let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
            let cache = RosterCache::with_builtin_strategies(fetcher);
            let roster = cache.get_roster(&code);

            if json {
                println!("{}", serde_json::to_string_pretty(roster.as_ref())?);
            } else {
                for seats in roster.values() {
                    for prosecutor in seats {
                        println!("{prosecutor}");
                    }
                }
            }
        }
        Commands::Jurisdictions => {
            for (code, name) in &config.jurisdictions {
                println!("{code}\t{name}");
            }
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

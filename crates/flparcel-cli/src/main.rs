mod municode;
mod parcel;
mod report;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use flparcel_adapter::{ArcGisClient, CountyRegistry, DispatchPolicy, ParcelLookup};
use flparcel_core::{AppConfig, CountyKey, Environment};
use tracing_subscriber::EnvFilter;

use crate::report::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "flparcel")]
#[command(about = "Florida county parcel lookup")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up one parcel by county and parcel id
    Lookup {
        /// County name (e.g., Hillsborough)
        county: String,
        /// Parcel id, with or without separators
        parcel_id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Look up every `county,parcel_id` line of a file
    Batch {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List supported counties and their parcel id formats
    Counties,
    /// Print the Municode zoning code link for a jurisdiction
    Municode {
        /// County name
        county: String,
        /// City within the county; city codes take priority
        #[arg(long)]
        city: Option<String>,
        /// Search the code for these terms
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = flparcel_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(log_ansi(&config))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Lookup {
            county,
            parcel_id,
            format,
        }) => {
            let lookup = build_lookup(&config)?;
            parcel::run_lookup(&lookup, &county, &parcel_id, format).await?;
        }
        Some(Commands::Batch { file, format }) => {
            let lookup = build_lookup(&config)?;
            parcel::run_batch(&lookup, &file, format).await?;
        }
        Some(Commands::Counties) => parcel::run_counties(&build_registry(&config)?),
        Some(Commands::Municode {
            county,
            city,
            search,
        }) => {
            let county: CountyKey = county.parse()?;
            let link = match search {
                Some(term) => municode::municode_search_link(county, city.as_deref(), &term),
                None => municode::municode_link(county, city.as_deref()).to_owned(),
            };
            println!("{link}");
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// Production logs go to collectors, so no color escapes.
fn log_ansi(config: &AppConfig) -> bool {
    !matches!(config.env, Environment::Production)
}

fn build_registry(config: &AppConfig) -> anyhow::Result<CountyRegistry> {
    let registry = CountyRegistry::florida(DispatchPolicy::from_app_config(config));
    let Some(path) = &config.county_overrides_path else {
        return Ok(registry);
    };
    let overrides = flparcel_core::load_county_overrides(path)?;
    tracing::debug!(
        path = %path.display(),
        counties = overrides.counties.len(),
        "loaded county overrides"
    );
    Ok(registry.with_overrides(&overrides))
}

fn build_lookup(config: &AppConfig) -> anyhow::Result<ParcelLookup> {
    let registry = build_registry(config)?;
    let client = ArcGisClient::new(&config.user_agent)?;
    Ok(ParcelLookup::new(registry, client)
        .with_max_concurrent_lookups(config.max_concurrent_lookups))
}

#[cfg(test)]
mod tests;

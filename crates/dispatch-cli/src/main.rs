mod commands;

use clap::{Parser, Subcommand};
use dispatch_core::Coordinate;
use dispatch_engine::BriefingEngine;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Wildfire dispatch briefing command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a full dispatch briefing for a community
    Briefing {
        /// Destination community, e.g. "Kamloops"
        #[arg(long)]
        community: String,

        /// Wildfire incident number, e.g. "K20512"
        #[arg(long)]
        fire_number: Option<String>,

        /// Origin place name to route from
        #[arg(long, conflicts_with = "origin_coords")]
        origin: Option<String>,

        /// Origin as "lat,lng"
        #[arg(long, value_parser = parse_lat_lng)]
        origin_coords: Option<Coordinate>,
    },
    /// Resolve a place name, reporting ambiguity instead of guessing
    Geocode {
        /// Free-text place name
        query: String,
    },
    /// Estimate a drive between two points
    Route {
        /// Origin as "lat,lng"
        #[arg(long, value_parser = parse_lat_lng)]
        from: Coordinate,

        /// Destination as "lat,lng"
        #[arg(long, value_parser = parse_lat_lng)]
        to: Coordinate,
    },
}

/// Parse `"lat,lng"` into a validated coordinate.
fn parse_lat_lng(raw: &str) -> Result<Coordinate, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got '{raw}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
    Coordinate::new(lat, lng).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dispatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let tables = dispatch_core::reference::load()
        .map_err(|e| anyhow::anyhow!("failed to load reference tables: {e}"))?;
    let engine = BriefingEngine::from_config(&config, tables)?;

    match cli.command {
        Commands::Briefing {
            community,
            fire_number,
            origin,
            origin_coords,
        } => {
            let request = commands::briefing_request(community, fire_number, origin, origin_coords);
            commands::run_briefing(&engine, &request).await?;
        }
        Commands::Geocode { query } => commands::run_geocode(&engine, &query).await?,
        Commands::Route { from, to } => commands::run_route(&engine, from, to).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;

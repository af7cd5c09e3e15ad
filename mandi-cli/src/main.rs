use anyhow::{Context, Result};
use clap::Parser;
use mandi_core::MarketFilter;
use mandi_data_services::{aggregate, DataGovClient, PriceRecordSource};
use tracing::{info, Level};

/// Published sample key for the data.gov.in open data platform; rate limited,
/// replace with a registered key for real use.
const SAMPLE_API_KEY: &str = "579b464db66ec23bdd0000011cf3d78fcf494f4164cdccb8704c30e8";

/// Mandi Price Trends CLI
///
/// Fetches current mandi price records for one commodity and location from
/// the data.gov.in resource API and prints the latest per-market prices with
/// history depth.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// State to filter on (e.g. "NCT of Delhi")
    #[arg(short = 's', long)]
    state: String,

    /// District to filter on (e.g. "Delhi")
    #[arg(short = 'd', long)]
    district: String,

    /// Commodity to filter on (e.g. "Tomato")
    #[arg(short = 'c', long)]
    commodity: String,

    /// data.gov.in API key
    #[arg(short = 'k', long, default_value = SAMPLE_API_KEY)]
    api_key: String,

    /// Maximum number of records to request
    #[arg(long, default_value = "1000")]
    limit: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Parse log level from string
    fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(args.parse_log_level())
        .with_target(false)
        .init();

    info!("🌾 Mandi Price Trends");
    info!("=====================");
    info!("  State: {}", args.state);
    info!("  District: {}", args.district);
    info!("  Commodity: {}", args.commodity);
    info!("");

    let filter = MarketFilter::new(&args.state, &args.district, &args.commodity);
    let client = DataGovClient::new(&args.api_key).with_limit(args.limit);

    let records = client
        .fetch_records(&filter)
        .await
        .context("Failed to fetch market data")?;
    info!("Fetched {} price records", records.len());

    let trends = aggregate(&records, &filter).context("Failed to aggregate market data")?;

    if trends.snapshots.is_empty() {
        info!("No mandis found for {} in {}", args.commodity, args.district);
        return Ok(());
    }

    // Sort by market name for stable output
    let mut snapshots: Vec<_> = trends.snapshots.values().collect();
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));

    info!("");
    info!("✅ {} mandis reporting {}", snapshots.len(), args.commodity);
    info!("=====================");
    for snapshot in snapshots {
        let points = trends.history.get(&snapshot.id).map_or(0, Vec::len);
        info!(
            "  {} ({}, {}): ₹{:.2} – ₹{:.2} per {} as of {} [{} history points]",
            snapshot.name,
            snapshot.district,
            snapshot.state,
            snapshot.price_range.min,
            snapshot.price_range.max,
            snapshot.unit,
            snapshot.as_of_date,
            points
        );
    }

    Ok(())
}

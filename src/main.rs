use anyhow::{Context, Result};
use clap::Parser;
use listing_scout::{Pipeline, ScoutConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Scrape Funda and Idealista listings into normalized records
#[derive(Debug, Parser)]
#[command(name = "listing-scout", version)]
struct Cli {
    /// Listing URLs to scrape
    urls: Vec<String>,

    /// File with one listing URL per line
    #[arg(long)]
    file: Option<PathBuf>,

    /// Where to write the JSON results
    #[arg(long, default_value = "scraped_listings.json")]
    output: PathBuf,

    /// Skip the headless browser tier
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut urls = cli.urls.clone();
    if let Some(path) = &cli.file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read URL list {}", path.display()))?;
        urls.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    if urls.is_empty() {
        anyhow::bail!("No listing URLs given; pass them as arguments or with --file");
    }

    let mut config = ScoutConfig::from_env().context("Invalid configuration")?;
    if cli.no_browser {
        config = config.without_browser();
    }

    info!("🏠 Listing Scout");
    info!("Scraping {} listing(s)", urls.len());

    let pipeline = Pipeline::from_config(&config).context("Failed to set up scraping pipeline")?;
    let entries = pipeline.scrape_batch(&urls).await;

    for (i, entry) in entries.iter().enumerate() {
        match &entry.record {
            Some(record) => {
                let tag = if record.is_estimated { " (estimated)" } else { "" };
                println!("{}. {}{}", i + 1, record.address, tag);
                println!("   Price: {}", record.price);
                println!("   Living area: {}", record.living_area);
                println!("   Bedrooms: {}, bathrooms: {}", record.bedrooms, record.bathrooms);
                println!("   Year built: {}", record.year_built);
                if let Some(per_sqm) = entry.price_per_sqm {
                    println!("   Price/m²: {:.2}", per_sqm);
                }
                println!("   URL: {}", record.source_url);
            }
            None => {
                warn!("{}. {} failed: {}", i + 1, entry.url, entry.error.as_deref().unwrap_or("unknown error"));
            }
        }
        println!();
    }

    let json = serde_json::to_string_pretty(&entries)?;
    tokio::fs::write(&cli.output, json)
        .await
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    info!("💾 Saved {} results to {}", entries.len(), cli.output.display());

    Ok(())
}

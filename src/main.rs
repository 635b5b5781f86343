mod address;
mod census;
mod config;
mod report;
mod tonapi;

use crate::census::CallerLedger;
use crate::config::Config;
use crate::report::CensusReport;
use crate::tonapi::{extract_item_addresses, TonApiClient};
use std::path::Path;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config
    let config = if Path::new("census.toml").exists() {
        Config::load(Path::new("census.toml"))?
    } else {
        info!("no census.toml found, using defaults");
        Config::default()
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!(
        collection = %config.tonapi.collection,
        "ton-nft-census v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let client = TonApiClient::new(&config.tonapi);

    // The collection listing is the one fatal fetch: without it there is
    // nothing to enumerate and the run ends with no report.
    let Some(listing) = client.fetch_collection_items(&config.tonapi.collection).await else {
        error!("collection listing fetch failed, aborting run");
        return Ok(());
    };

    let items = extract_item_addresses(&listing);
    info!(items = items.len(), "collection enumerated");

    // One history request in flight at a time, in listing order. A failed
    // item is skipped; its callers simply don't show up.
    let mut ledger = CallerLedger::default();
    for item in &items {
        let Some(history) = client.fetch_account_history(item).await else {
            warn!(item = %item, "history fetch failed, skipping item");
            continue;
        };
        ledger.merge(CallerLedger::from_history(&history));
    }

    info!(
        items = items.len(),
        unique_callers = ledger.unique_callers(),
        "census complete"
    );

    let report = CensusReport::from_ledger(&ledger, &config.address);
    for line in report.lines() {
        println!("{}", line);
    }

    Ok(())
}

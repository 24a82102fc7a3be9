mod catalog;
mod config;
mod dataset;
mod market;
mod pipeline;
mod selector;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use catalog::Catalog;
use config::Config;
use dataset::store::DatasetStore;
use market::fetcher::FindingClient;
use selector::outlier::OutlierRobustSelector;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!(
        category = ?config.category,
        dataset = %config.dataset_path.display(),
        "price-engine starting"
    );

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path, config.category)?,
        None => {
            // No catalog file configured: price every component the dataset
            // already tracks.
            let store = DatasetStore::load(&config.dataset_path, config.category)?;
            Catalog::from_store(&store)
        }
    };

    let source = Arc::new(FindingClient::new(&config)?);
    let selector = OutlierRobustSelector::new(config.threshold_ratio);

    let summary = pipeline::run(&config, &catalog, source, &selector).await?;

    info!(
        components = summary.components,
        listings_kept = summary.listings_kept,
        quotes = summary.quotes,
        rows_updated = summary.rows_updated,
        "run complete"
    );

    Ok(())
}

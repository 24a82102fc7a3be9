//! Single-pass run orchestration:
//! fetch (bounded concurrent) → select (per component) → merge (sequential).

use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::dataset::merge;
use crate::dataset::store::DatasetStore;
use crate::market::fetcher::ListingSource;
use crate::market::types::Listing;
use crate::selector::traits::PriceSelector;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub components: usize,
    pub listings_kept: usize,
    pub quotes: usize,
    pub rows_updated: usize,
}

/// Drive one full pipeline pass.
///
/// Fetch failures are absorbed per component (empty listing set, no quote);
/// only dataset problems abort the run, and nothing is written in that case.
pub async fn run(
    config: &Config,
    catalog: &Catalog,
    source: Arc<dyn ListingSource>,
    selector: &dyn PriceSelector,
) -> anyhow::Result<RunSummary> {
    info!(
        components = catalog.len(),
        concurrency = config.concurrency,
        "fetch stage starting"
    );

    // One slot per component name; each fetch task writes only its own.
    let results: DashMap<String, Vec<Listing>> = DashMap::new();

    stream::iter(catalog.components())
        .for_each_concurrent(config.concurrency, |component| {
            let source = Arc::clone(&source);
            let results = &results;
            async move {
                let listings = source.search(component).await;
                debug!(component = %component.name, listings = listings.len(), "fetch complete");
                results.insert(component.name.clone(), listings);
            }
        })
        .await;

    let mut quotes = Vec::new();
    let mut listings_kept = 0;
    for component in catalog.components() {
        let listings = results
            .remove(&component.name)
            .map(|(_, listings)| listings)
            .unwrap_or_default();
        listings_kept += listings.len();

        match selector.select(component, &listings) {
            Some(quote) => {
                info!(
                    component = %component.name,
                    price = quote.price,
                    title = %quote.title,
                    selector = selector.name(),
                    "quote selected"
                );
                quotes.push(quote);
            }
            None => debug!(component = %component.name, "no plausible quote"),
        }
    }

    let mut store = DatasetStore::load(&config.dataset_path, config.category)?;
    let rows_updated = merge::apply_quotes(&mut store, &quotes, config.overwrite_policy)?;
    merge::recompute_metrics(&mut store)?;
    store.save(&config.dataset_path)?;

    info!(
        rows_updated,
        dataset = %config.dataset_path.display(),
        "dataset merged"
    );

    Ok(RunSummary {
        components: catalog.len(),
        listings_kept,
        quotes: quotes.len(),
        rows_updated,
    })
}

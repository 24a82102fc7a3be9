use std::path::PathBuf;

use anyhow::Context;

use crate::catalog::Category;
use crate::dataset::merge::OverwritePolicy;

const DEFAULT_ENDPOINT: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

/// Single page of results per component; the API caps page size at 100.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub endpoint: String,
    pub category: Category,
    pub dataset_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub page_size: u32,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub threshold_ratio: f64,
    pub overwrite_policy: OverwritePolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        let app_id = std::env::var("EBAY_APP_ID").context("EBAY_APP_ID must be set")?;
        let endpoint = var_or("FINDING_ENDPOINT", DEFAULT_ENDPOINT);

        let category = Category::parse(&var_or("CATEGORY", "gpu"))?;
        let dataset_path = std::env::var("DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(category.default_dataset_path()));
        let catalog_path = std::env::var("CATALOG_PATH").ok().map(PathBuf::from);

        let page_size: u32 = parse_var("PAGE_SIZE", 50)?;
        let concurrency = parse_var("CONCURRENCY", 8)?;
        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", 10)?;
        let threshold_ratio = parse_var("PRICE_THRESHOLD_RATIO", 0.40)?;
        let overwrite_policy = OverwritePolicy::parse(&var_or("OVERWRITE_POLICY", "always"))?;

        Ok(Self {
            app_id,
            endpoint,
            category,
            dataset_path,
            catalog_path,
            page_size: page_size.min(MAX_PAGE_SIZE),
            concurrency,
            request_timeout_secs,
            threshold_ratio,
            overwrite_policy,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid {key} '{raw}': {err}")),
        Err(_) => Ok(default),
    }
}

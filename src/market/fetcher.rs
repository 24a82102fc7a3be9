use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::catalog::Component;
use crate::config::Config;
use crate::market::filter::ListingFilter;
use crate::market::types::Listing;
use crate::market::xml;

/// Condition codes accepted for quoting: new through seller-refurbished.
/// For-parts listings are excluded at the API level and again by the
/// banned-term filter for sellers who miscategorize.
const CONDITION_CODES: [&str; 6] = ["1000", "2000", "3000", "4000", "5000", "6000"];

/// Where listings come from.
///
/// Infallible by contract: every failure mode (network, status, parse,
/// timeout) is handled inside the implementation and yields an empty set,
/// so one bad component never disturbs its siblings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, component: &Component) -> Vec<Listing>;
}

/// Keyword-search client for the marketplace Finding API.
pub struct FindingClient {
    client: Client,
    endpoint: String,
    app_id: String,
    page_size: u32,
}

impl FindingClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            app_id: config.app_id.clone(),
            page_size: config.page_size,
        })
    }

    async fn search_inner(&self, component: &Component) -> anyhow::Result<Vec<Listing>> {
        let page_size = self.page_size.to_string();
        let mut params: Vec<(String, String)> = vec![
            ("OPERATION-NAME".into(), "findItemsByKeywords".into()),
            ("SERVICE-VERSION".into(), "1.0.0".into()),
            ("SECURITY-APPNAME".into(), self.app_id.clone()),
            ("RESPONSE-DATA-FORMAT".into(), "XML".into()),
            ("paginationInput.entriesPerPage".into(), page_size),
            ("sortOrder".into(), "BestMatch".into()),
            ("itemFilter(0).name".into(), "ListingType".into()),
            ("itemFilter(0).value".into(), "FixedPrice".into()),
            ("itemFilter(1).name".into(), "Condition".into()),
        ];
        for (i, code) in CONDITION_CODES.iter().enumerate() {
            params.push((format!("itemFilter(1).value({i})"), (*code).into()));
        }
        params.push(("keywords".into(), component.name.clone()));

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .context("request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("search returned status {status}");
        }

        let body = response.text().await.context("reading response body")?;
        let mut listings =
            xml::parse_search_response(&body).context("parsing search response")?;

        let filter = ListingFilter::for_component(component);
        let fetched = listings.len();
        listings.retain(|l| filter.accepts(&l.title));

        debug!(
            component = %component.name,
            fetched,
            kept = listings.len(),
            "listings filtered"
        );

        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for FindingClient {
    async fn search(&self, component: &Component) -> Vec<Listing> {
        match self.search_inner(component).await {
            Ok(listings) => listings,
            Err(err) => {
                warn!(
                    component = %component.name,
                    error = %err,
                    "search failed, treating as empty result"
                );
                Vec::new()
            }
        }
    }
}

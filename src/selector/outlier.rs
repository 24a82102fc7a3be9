use crate::catalog::Component;
use crate::market::types::{Listing, PriceQuote};

use super::traits::PriceSelector;

/// Cheapest-plausible selection.
///
/// The single cheapest listing is disproportionately likely to be a
/// miscategorized or broken unit, so candidates are judged against the
/// average price of everything *except* the cheapest listing: the first
/// listing (ascending) at or above `threshold_ratio * avg` wins.
pub struct OutlierRobustSelector {
    threshold_ratio: f64,
}

impl OutlierRobustSelector {
    pub fn new(threshold_ratio: f64) -> Self {
        Self { threshold_ratio }
    }
}

impl PriceSelector for OutlierRobustSelector {
    fn name(&self) -> &'static str {
        "outlier-robust"
    }

    fn select(&self, component: &Component, listings: &[Listing]) -> Option<PriceQuote> {
        if listings.is_empty() {
            return None;
        }

        let mut sorted: Vec<&Listing> = listings.iter().collect();
        sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

        let picked = if sorted.len() == 1 {
            // No peer population to judge a lone survivor against.
            Some(sorted[0])
        } else {
            let others = &sorted[1..];
            let avg = others.iter().map(|l| l.price).sum::<f64>() / others.len() as f64;
            let cutoff = self.threshold_ratio * avg;
            sorted.iter().copied().find(|l| l.price >= cutoff)
        };

        picked.map(|listing| PriceQuote {
            component_name: component.name.clone(),
            price: listing.price,
            title: listing.title.clone(),
            url: listing.url.clone(),
            condition: listing.condition.clone(),
        })
    }
}

use crate::catalog::Component;
use crate::market::types::{Listing, PriceQuote};

/// Picks at most one representative quote from the listings that survived
/// filtering for a component.
///
/// Kept synchronous and infallible by design: selectors read an in-memory
/// snapshot, not I/O. Returning `None` means no listing is plausible and
/// the component's persisted price is left alone this run.
pub trait PriceSelector: Send + Sync {
    fn name(&self) -> &'static str;

    fn select(&self, component: &Component, listings: &[Listing]) -> Option<PriceQuote>;
}

/// One candidate offer returned by the marketplace search for a component.
/// Lives only for the duration of a fetch pass; never persisted.
#[derive(Debug, Clone)]
pub struct Listing {
    pub price: f64,
    pub title: String,
    pub url: String,
    pub condition: String,
}

/// The single price chosen to represent a component's street price for
/// the current run. At most one per component.
#[derive(Debug, Clone)]
pub struct PriceQuote {
    pub component_name: String,
    pub price: f64,
    pub title: String,
    pub url: String,
    pub condition: String,
}

pub mod fetcher;
pub mod filter;
pub mod types;
pub mod xml;

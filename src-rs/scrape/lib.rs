pub mod client;
pub mod country;
pub mod parser;
pub mod source;

pub use client::ScrapingClient;
pub use source::{CatalogSource, HttpCatalogSource, ScrapeConfig, ScrapeError};

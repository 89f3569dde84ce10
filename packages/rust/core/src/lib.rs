//! Scraper orchestration and the per-country scrapers.
//!
//! Every scraper follows the same linear flow, driven by
//! [`pipeline::run_scraper`]: fetch the source page, extract the dose counts,
//! enrich the record with fixed metadata, and increment the location's series.

pub mod countries;
pub mod enrich;
pub mod pipeline;

pub use countries::CountryRegistry;
pub use pipeline::{
    CountryScraper, Pipeline, ProgressReporter, ScrapeContext, ScrapeOutcome, SilentProgress,
    run_scraper,
};

//! Shared types, error model, and configuration for vaxscrape.
//!
//! This crate is the foundation depended on by all other vaxscrape crates.
//! It provides:
//! - [`VaxError`] — the unified error type
//! - Domain types ([`VaccinationRecord`], [`PartialRecord`], [`DatasetPaths`])
//! - Value cleaning ([`clean_count`]) and timezone-local dates ([`localdate`])
//! - Configuration ([`AppConfig`], [`HttpConfig`], [`BrowserConfig`], config loading)

pub mod clean;
pub mod config;
pub mod dates;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use clean::clean_count;
pub use config::{
    AppConfig, BrowserConfig, BrowserSection, HttpConfig, HttpSection, OutputSection,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use dates::{localdate, localdate_at};
pub use error::{Result, VaxError};
pub use types::{CSV_COLUMNS, DatasetPaths, PartialRecord, VaccinationRecord};

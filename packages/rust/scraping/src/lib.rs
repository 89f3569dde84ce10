//! Page fetching and extraction primitives used by the country scrapers.
//!
//! This crate provides:
//! - [`http`] — `reqwest`-backed fetcher for static pages
//! - [`select`] — CSS-selector helpers over parsed `scraper::Html`
//! - [`browser`] — the [`Browser`] trait and its WebDriver implementation for
//!   pages that only render with JavaScript

pub mod browser;
pub mod http;
pub mod select;

pub use browser::{Browser, RenderedElement, WebDriverBrowser};
pub use http::HttpFetcher;
pub use select::{descendant_attr, nth_element, nth_text};

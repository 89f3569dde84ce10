//! Built-in country scrapers and the registry that looks them up.

pub mod jordan;
pub mod saint_lucia;

pub use jordan::Jordan;
pub use saint_lucia::SaintLucia;

use crate::pipeline::CountryScraper;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds every registered scraper, in run order.
pub struct CountryRegistry {
    scrapers: Vec<Box<dyn CountryScraper>>,
}

impl CountryRegistry {
    /// Create a registry with all built-in scrapers.
    pub fn new() -> Self {
        Self {
            scrapers: vec![Box::new(Jordan::default()), Box::new(SaintLucia::default())],
        }
    }

    /// Find a scraper by slug (`saint_lucia`) or location name (`Saint Lucia`),
    /// ignoring case.
    pub fn get(&self, name: &str) -> Option<&dyn CountryScraper> {
        let wanted = name.trim();
        self.scrapers
            .iter()
            .find(|s| {
                s.slug().eq_ignore_ascii_case(wanted) || s.location().eq_ignore_ascii_case(wanted)
            })
            .map(|s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CountryScraper> {
        self.scrapers.iter().map(|s| s.as_ref())
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.iter().map(|s| s.slug()).collect()
    }
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_slug_or_location() {
        let registry = CountryRegistry::new();
        assert_eq!(registry.get("jordan").unwrap().location(), "Jordan");
        assert_eq!(registry.get("Saint Lucia").unwrap().slug(), "saint_lucia");
        assert_eq!(registry.get(" SAINT_LUCIA ").unwrap().location(), "Saint Lucia");
        assert!(registry.get("atlantis").is_none());
    }

    #[test]
    fn slugs_are_unique_and_ordered() {
        let registry = CountryRegistry::new();
        assert_eq!(registry.slugs(), vec!["jordan", "saint_lucia"]);
    }

    #[test]
    fn default_sources_are_official() {
        let registry = CountryRegistry::new();
        let sources: Vec<&str> = registry.iter().map(|s| s.source_url()).collect();
        assert_eq!(
            sources,
            vec!["https://corona.moh.gov.jo/ar", "https://www.covid19response.lc/"]
        );
    }
}

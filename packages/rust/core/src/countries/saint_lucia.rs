//! Saint Lucia — national COVID-19 response site.
//!
//! The first two `.repart-stlucia` elements hold the first-dose and
//! second-dose counts.

use async_trait::async_trait;
use scraper::Html;
use tracing::instrument;
use url::Url;

use vaxscrape_scraping::nth_text;
use vaxscrape_shared::{DatasetPaths, PartialRecord, Result, VaxError, clean_count};

use crate::enrich;
use crate::pipeline::{
    CountryScraper, Pipeline, ScrapeContext, ScrapeOutcome, SilentProgress, run_scraper,
};

pub const LOCATION: &str = "Saint Lucia";
pub const SOURCE_URL: &str = "https://www.covid19response.lc/";

const TIMEZONE: &str = "America/St_Lucia";
const VACCINES: &str = "Oxford/AstraZeneca";
const COUNT_SELECTOR: &str = ".repart-stlucia";

/// Scraper for Saint Lucia.
pub struct SaintLucia {
    source_url: String,
}

impl Default for SaintLucia {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
        }
    }
}

impl SaintLucia {
    pub fn with_source_url(url: impl Into<String>) -> Self {
        Self {
            source_url: url.into(),
        }
    }
}

#[async_trait]
impl CountryScraper for SaintLucia {
    fn slug(&self) -> &str {
        "saint_lucia"
    }

    fn location(&self) -> &str {
        LOCATION
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    #[instrument(skip_all, fields(source = %self.source_url))]
    async fn read(&self, ctx: &ScrapeContext) -> Result<PartialRecord> {
        let page = Url::parse(&self.source_url)
            .map_err(|e| VaxError::config(format!("bad source url '{}': {e}", self.source_url)))?;
        let body = ctx.http.get_text(&page).await?;
        parse_doses(&body)
    }

    fn pipeline(&self, ctx: &ScrapeContext) -> Pipeline {
        Pipeline::new()
            .pipe("vaccinations", enrich::derive_total())
            .pipe("date", enrich::local_date(TIMEZONE, ctx.now(), None))
            .pipe("location", enrich::location(LOCATION))
            .pipe("vaccine", enrich::vaccine(VACCINES))
            .pipe("source", enrich::source_url(&self.source_url))
    }
}

/// Entry point for the orchestrator.
pub async fn main(ctx: &ScrapeContext, paths: &DatasetPaths) -> Result<ScrapeOutcome> {
    run_scraper(&SaintLucia::default(), ctx, paths, &SilentProgress).await
}

fn parse_doses(html: &str) -> Result<PartialRecord> {
    let doc = Html::parse_document(html);
    let first = clean_count(&nth_text(&doc, COUNT_SELECTOR, 0)?)?;
    let second = clean_count(&nth_text(&doc, COUNT_SELECTOR, 1)?)?;
    Ok(PartialRecord::with_doses(first, second))
}

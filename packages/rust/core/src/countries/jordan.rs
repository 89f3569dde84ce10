//! Jordan — Ministry of Health dashboard.
//!
//! Only the Arabic site carries vaccination figures. They live in a
//! JavaScript dashboard embedded as an iframe (inside the second `section`
//! of the page body), so the iframe is rendered in the browser and the dose
//! counts are read from the `aria-label` of each `.card`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use tracing::{info, instrument};
use url::Url;

use vaxscrape_scraping::{descendant_attr, nth_element};
use vaxscrape_shared::{DatasetPaths, PartialRecord, Result, VaxError, clean_count};

use crate::enrich;
use crate::pipeline::{
    CountryScraper, Pipeline, ScrapeContext, ScrapeOutcome, SilentProgress, run_scraper,
};

pub const LOCATION: &str = "Jordan";
pub const SOURCE_URL: &str = "https://corona.moh.gov.jo/ar";

const TIMEZONE: &str = "Asia/Amman";
// Johnson&Johnson is authorized but no doses have been given.
const VACCINES: &str = "Pfizer/BioNTech, Sinopharm/Beijing, Sputnik V, Oxford/AstraZeneca";

const CARD_SELECTOR: &str = ".card";
const CARD_LABEL: &str = "aria-label";

static FIRST_DOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"first dose +(\d+)\.").expect("valid regex"));
static SECOND_DOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sec dose +(\d+)\.").expect("valid regex"));

/// Scraper for Jordan.
pub struct Jordan {
    source_url: String,
}

impl Default for Jordan {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
        }
    }
}

impl Jordan {
    /// Read from another address (mirrors, tests).
    pub fn with_source_url(url: impl Into<String>) -> Self {
        Self {
            source_url: url.into(),
        }
    }
}

#[async_trait]
impl CountryScraper for Jordan {
    fn slug(&self) -> &str {
        "jordan"
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

        // The ministry's certificate chain does not verify.
        let body = ctx.http.get_text_unverified(&page).await?;
        let dashboard = iframe_url(&body, &page)?;
        info!(%dashboard, "dashboard iframe located");

        let cards = ctx
            .browser
            .collect_visible(&dashboard, CARD_SELECTOR, &[CARD_LABEL])
            .await?;
        let labels: Vec<&str> = cards.iter().filter_map(|c| c.attr(CARD_LABEL)).collect();

        let (first, second) = parse_dose_labels(&labels)?;
        Ok(PartialRecord::with_doses(first, second))
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
    run_scraper(&Jordan::default(), ctx, paths, &SilentProgress).await
}

/// `src` of the iframe in the body's second `section`, resolved against `base`.
fn iframe_url(html: &str, base: &Url) -> Result<Url> {
    let doc = Html::parse_document(html);
    let section = nth_element(&doc, "body section", 1)?;
    let src = descendant_attr(section, "iframe", "src")?;

    base.join(&src)
        .map_err(|e| VaxError::parse(format!("iframe src '{src}' is not a URL: {e}")))
}

/// Dose counts from the card labels: `(people_vaccinated, people_fully_vaccinated)`.
fn parse_dose_labels(labels: &[&str]) -> Result<(u64, u64)> {
    let mut first = None;
    let mut second = None;

    for label in labels {
        if label.contains("first dose") {
            first = Some(capture_count(&FIRST_DOSE, label)?);
        } else if label.contains("sec dose") {
            second = Some(capture_count(&SECOND_DOSE, label)?);
        }
    }

    match (first, second) {
        (Some(first), Some(second)) => Ok((first, second)),
        (None, _) => Err(VaxError::parse("no card labelled 'first dose'")),
        (_, None) => Err(VaxError::parse("no card labelled 'sec dose'")),
    }
}

fn capture_count(re: &Regex, label: &str) -> Result<u64> {
    let caps = re
        .captures(label)
        .ok_or_else(|| VaxError::parse(format!("label {label:?} does not match {re}")))?;
    clean_count(&caps[1])
}

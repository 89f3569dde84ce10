//! End-to-end scraper run: read → enrich → increment.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use vaxscrape_scraping::{Browser, HttpFetcher, WebDriverBrowser};
use vaxscrape_shared::{
    AppConfig, BrowserConfig, DatasetPaths, HttpConfig, PartialRecord, Result, VaccinationRecord,
};
use vaxscrape_storage::IncrementOutcome;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a scraper needs from the outside world.
#[derive(Clone)]
pub struct ScrapeContext {
    /// Client for static pages.
    pub http: HttpFetcher,
    /// Renderer for pages that need JavaScript.
    pub browser: Arc<dyn Browser>,
    fixed_now: Option<DateTime<Utc>>,
}

impl ScrapeContext {
    pub fn new(http: HttpFetcher, browser: Arc<dyn Browser>) -> Self {
        Self {
            http,
            browser,
            fixed_now: None,
        }
    }

    /// Build the production context: `reqwest` for pages, WebDriver for rendering.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpFetcher::new(&HttpConfig::from(config))?;
        let browser = WebDriverBrowser::new(BrowserConfig::from(config));
        Ok(Self::new(http, Arc::new(browser)))
    }

    /// Pin the clock, so local dates are reproducible.
    pub fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Current instant (or the pinned one).
    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

type Step = Box<dyn Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync>;

/// Ordered, named enrichment steps applied to one extracted record.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<(&'static str, Step)>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn pipe<F>(mut self, name: &'static str, step: F) -> Self
    where
        F: Fn(PartialRecord) -> Result<PartialRecord> + Send + Sync + 'static,
    {
        self.steps.push((name, Box::new(step)));
        self
    }

    /// Names of the steps, in order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(name, _)| *name).collect()
    }

    /// Run every step in order; the first failure stops the pipeline.
    pub fn run(&self, record: PartialRecord) -> Result<PartialRecord> {
        self.steps.iter().try_fold(record, |record, (name, step)| {
            debug!(step = name, "pipeline step");
            step(record)
        })
    }
}

// ---------------------------------------------------------------------------
// Scraper trait
// ---------------------------------------------------------------------------

/// A per-country scraper.
#[async_trait]
pub trait CountryScraper: Send + Sync {
    /// Short identifier used on the command line (e.g. `saint_lucia`).
    fn slug(&self) -> &str;

    /// Location name written into every record.
    fn location(&self) -> &str;

    /// Page the figures are read from.
    fn source_url(&self) -> &str;

    /// Fetch the source and extract the counts it publishes.
    async fn read(&self, ctx: &ScrapeContext) -> Result<PartialRecord>;

    /// Enrichment steps that complete the record.
    fn pipeline(&self, ctx: &ScrapeContext) -> Pipeline;
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Result of one scraper run.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// The record that was written.
    pub record: VaccinationRecord,
    /// What the increment did.
    pub increment: IncrementOutcome,
    pub elapsed: Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the run completes.
    fn done(&self, outcome: &ScrapeOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &ScrapeOutcome) {}
}

/// Run one scraper: read the source, enrich, and append the row.
#[instrument(skip_all, fields(country = scraper.slug()))]
pub async fn run_scraper(
    scraper: &dyn CountryScraper,
    ctx: &ScrapeContext,
    paths: &DatasetPaths,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeOutcome> {
    let start = Instant::now();

    progress.phase(&format!("{}: reading {}", scraper.location(), scraper.source_url()));
    let extracted = scraper.read(ctx).await?;
    debug!(?extracted, "extracted");

    progress.phase(&format!("{}: enriching", scraper.location()));
    let record = scraper.pipeline(ctx).run(extracted)?.into_record()?;

    progress.phase(&format!("{}: writing", scraper.location()));
    let increment = vaxscrape_storage::increment(paths, &record)?;

    let outcome = ScrapeOutcome {
        record,
        increment,
        elapsed: start.elapsed(),
    };
    progress.done(&outcome);

    info!(
        date = %outcome.record.date,
        total_vaccinations = outcome.record.total_vaccinations,
        people_vaccinated = outcome.record.people_vaccinated,
        people_fully_vaccinated = outcome.record.people_fully_vaccinated,
        elapsed_ms = outcome.elapsed.as_millis(),
        "scraper run complete"
    );

    Ok(outcome)
}

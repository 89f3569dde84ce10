//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use vaxscrape_core::{
    CountryRegistry, CountryScraper, ProgressReporter, ScrapeContext, ScrapeOutcome, run_scraper,
};
use vaxscrape_shared::{AppConfig, DatasetPaths, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// vaxscrape — official COVID-19 vaccination figures, one row per day.
#[derive(Parser)]
#[command(
    name = "vaxscrape",
    version,
    about = "Scrape official vaccination statistics and append them to per-location series.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run scrapers and append today's figures.
    Run {
        /// Countries to run (slug or name). Runs all when omitted.
        countries: Vec<String>,

        /// Directory holding the per-location CSV files.
        #[arg(short, long, env = "VAXSCRAPE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// WebDriver endpoint for pages that need a browser.
        #[arg(long, env = "VAXSCRAPE_WEBDRIVER_URL")]
        webdriver_url: Option<String>,
    },

    /// List the available scrapers.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print a location's stored series.
    Show {
        /// Country slug or name.
        country: String,

        /// Directory holding the per-location CSV files.
        #[arg(short, long, env = "VAXSCRAPE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "vaxscrape=info",
        1 => "vaxscrape=debug",
        _ => "vaxscrape=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            countries,
            output_dir,
            webdriver_url,
        } => cmd_run(&countries, output_dir, webdriver_url).await,
        Command::List { json } => cmd_list(json),
        Command::Show {
            country,
            output_dir,
        } => cmd_show(&country, output_dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Config file values with CLI overrides applied.
fn resolve_config(output_dir: Option<PathBuf>, webdriver_url: Option<String>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(dir) = output_dir {
        config.output.automated_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(url) = webdriver_url {
        config.browser.webdriver_url = url;
    }
    Ok(config)
}

/// Resolve names to scrapers; all of them when `names` is empty.
fn select_scrapers<'a>(
    registry: &'a CountryRegistry,
    names: &[String],
) -> Result<Vec<&'a dyn CountryScraper>> {
    if names.is_empty() {
        return Ok(registry.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            registry.get(name).ok_or_else(|| {
                eyre!(
                    "unknown country '{name}': expected one of {}",
                    registry.slugs().join(", ")
                )
            })
        })
        .collect()
}

async fn cmd_run(
    countries: &[String],
    output_dir: Option<PathBuf>,
    webdriver_url: Option<String>,
) -> Result<()> {
    let config = resolve_config(output_dir, webdriver_url)?;
    let paths = DatasetPaths::from(&config);
    let ctx = ScrapeContext::from_config(&config)?;

    let registry = CountryRegistry::new();
    let scrapers = select_scrapers(&registry, countries)?;

    info!(
        count = scrapers.len(),
        output = %paths.automated_dir.display(),
        "running scrapers"
    );

    run_scrapers(&scrapers, &ctx, &paths).await
}

/// Run each scraper in order. A failure is reported and the rest still run;
/// the result is an error naming every scraper that failed.
async fn run_scrapers(
    scrapers: &[&dyn CountryScraper],
    ctx: &ScrapeContext,
    paths: &DatasetPaths,
) -> Result<()> {
    let mut failed = Vec::new();
    for &scraper in scrapers {
        let reporter = CliProgress::new();
        match run_scraper(scraper, ctx, paths, &reporter).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => {
                reporter.fail();
                error!(country = scraper.slug(), error = %e, "scraper failed");
                println!("  {:<14} FAILED  {e}", scraper.location());
                failed.push(scraper.slug().to_string());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} scraper(s) failed: {}", failed.len(), failed.join(", ")))
    }
}

fn print_outcome(outcome: &ScrapeOutcome) {
    let r = &outcome.record;
    println!(
        "  {:<14} {}  total={} first={} second={}  ({:?}, {} rows, {:.1}s)",
        r.location,
        r.date,
        r.total_vaccinations,
        r.people_vaccinated,
        r.people_fully_vaccinated,
        outcome.increment.action,
        outcome.increment.rows,
        outcome.elapsed.as_secs_f64()
    );
}

fn cmd_list(json: bool) -> Result<()> {
    let registry = CountryRegistry::new();

    if json {
        let entries: Vec<serde_json::Value> = registry
            .iter()
            .map(|s| {
                serde_json::json!({
                    "slug": s.slug(),
                    "location": s.location(),
                    "source_url": s.source_url(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for s in registry.iter() {
        println!("  {:<14} {:<14} {}", s.slug(), s.location(), s.source_url());
    }
    Ok(())
}

fn cmd_show(country: &str, output_dir: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(output_dir, None)?;
    let paths = DatasetPaths::from(&config);

    let registry = CountryRegistry::new();
    let scraper = registry
        .get(country)
        .ok_or_else(|| eyre!("unknown country '{country}'"))?;

    let path = paths.location_file(scraper.location());
    if !path.exists() {
        return Err(eyre!("no series yet at '{}'", path.display()));
    }

    let series = vaxscrape_storage::read_series(&path)?;
    println!("  {} ({} rows)", scraper.location(), series.len());
    println!("  {:<10} {:>14} {:>14} {:>14}", "date", "total", "first", "second");
    for r in &series {
        println!(
            "  {:<10} {:>14} {:>14} {:>14}",
            r.date.to_string(),
            r.total_vaccinations,
            r.people_vaccinated,
            r.people_fully_vaccinated
        );
    }
    if let Some(last) = series.last() {
        println!("  vaccine: {}", last.vaccine);
        println!("  source:  {}", last.source_url);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn fail(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &ScrapeOutcome) {
        self.spinner.finish_and_clear();
    }
}

//! Application configuration for vaxscrape.
//!
//! User config lives at `~/.vaxscrape/vaxscrape.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaxError};
use crate::types::DatasetPaths;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "vaxscrape.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".vaxscrape";

// ---------------------------------------------------------------------------
// Config structs (matching vaxscrape.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where increments are written.
    #[serde(default)]
    pub output: OutputSection,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpSection,

    /// WebDriver settings for pages that need JavaScript.
    #[serde(default)]
    pub browser: BrowserSection,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory holding one CSV per location.
    #[serde(default = "default_automated_dir")]
    pub automated_dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            automated_dir: default_automated_dir(),
        }
    }
}

fn default_automated_dir() -> String {
    "output/vaccinations/automated".into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSection {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override for the User-Agent header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[browser]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSection {
    /// WebDriver endpoint (chromedriver, geckodriver, selenium).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// How long to wait for elements to become visible.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Delay between visibility checks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".into()
}
fn default_true() -> bool {
    true
}
fn default_wait_timeout_secs() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    250
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl From<&AppConfig> for HttpConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.http.timeout_secs),
            user_agent: config.http.user_agent.clone(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&AppConfig> for BrowserConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            webdriver_url: config.browser.webdriver_url.clone(),
            headless: config.browser.headless,
            wait_timeout: Duration::from_secs(config.browser.wait_timeout_secs),
            poll_interval: Duration::from_millis(config.browser.poll_interval_ms),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for DatasetPaths {
    fn from(config: &AppConfig) -> Self {
        DatasetPaths::new(&config.output.automated_dir)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.vaxscrape/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| VaxError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.vaxscrape/vaxscrape.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VaxError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| VaxError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| VaxError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| VaxError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| VaxError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("automated_dir"));
        assert!(toml_str.contains("http://localhost:4444"));
        assert!(!toml_str.contains("user_agent"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[output]
automated_dir = "/data/automated"

[browser]
headless = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.output.automated_dir, "/data/automated");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.wait_timeout_secs, 30);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn runtime_configs_from_app_config() {
        let mut app = AppConfig::default();
        app.http.user_agent = Some("ua-test".into());
        app.browser.poll_interval_ms = 100;

        let http = HttpConfig::from(&app);
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(http.user_agent.as_deref(), Some("ua-test"));

        let browser = BrowserConfig::from(&app);
        assert_eq!(browser.poll_interval, Duration::from_millis(100));
        assert!(browser.headless);

        let paths = DatasetPaths::from(&app);
        assert_eq!(
            paths.location_file("Jordan"),
            PathBuf::from("output/vaccinations/automated/Jordan.csv")
        );
    }

    #[test]
    fn malformed_config_is_config_error() {
        let dir = std::env::temp_dir().join(format!("vax-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = \"soon\"\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, VaxError::Config { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}

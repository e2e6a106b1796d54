//! Application configuration for wikimd.
//!
//! User config lives at `~/.wikimd/wikimd.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiMdError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikimd.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikimd";

/// Placeholder replaced by the language code in [`SourceConfig::api_url`].
pub const LANG_PLACEHOLDER: &str = "{lang}";

// ---------------------------------------------------------------------------
// Config structs (matching wikimd.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Encyclopedia API settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Link resolution settings.
    #[serde(default)]
    pub links: LinksConfig,
}

/// How a detected display-math marker line is turned into Markdown math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathStyle {
    /// Overwrite the first and last character of the trimmed line with `$`.
    #[default]
    Overwrite,
    /// Strip the `\displaystyle` marker and wrap the formula in `$...$`.
    Wrap,
}

impl FromStr for MathStyle {
    type Err = WikiMdError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "wrap" => Ok(Self::Wrap),
            other => Err(WikiMdError::config(format!(
                "unknown math style '{other}': expected 'overwrite' or 'wrap'"
            ))),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Languages to look the topic up in, in priority order.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Whether to download images next to the Markdown file.
    #[serde(default = "default_true")]
    pub download_images: bool,

    /// Directory the Markdown file (or the topic directory) is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Display-math conversion style.
    #[serde(default)]
    pub math_style: MathStyle,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            download_images: true,
            output_dir: default_output_dir(),
            math_style: MathStyle::default(),
        }
    }
}

fn default_languages() -> Vec<String> {
    vec!["de".into(), "en".into()]
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> String {
    ".".into()
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// MediaWiki API endpoint; `{lang}` is replaced with the language code.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for a single API request, in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://{lang}.wikipedia.org/w/api.php".into()
}
fn default_source_timeout() -> u64 {
    30
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Maximum number of link resolutions in flight at once.
    #[serde(default = "default_link_concurrency")]
    pub concurrency: usize,

    /// Per-link resolution timeout, in seconds.
    #[serde(default = "default_link_timeout")]
    pub timeout_secs: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            concurrency: default_link_concurrency(),
            timeout_secs: default_link_timeout(),
        }
    }
}

fn default_link_concurrency() -> usize {
    100
}
fn default_link_timeout() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Convert config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime conversion configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Languages to try, in order.
    pub languages: Vec<String>,
    /// Whether images are downloaded and embedded.
    pub download_images: bool,
    /// Output root directory.
    pub output_dir: PathBuf,
    /// Display-math conversion style.
    pub math_style: MathStyle,
    /// MediaWiki API endpoint template.
    pub api_url: String,
    /// API request timeout in seconds.
    pub source_timeout_secs: u64,
    /// Link resolution pool size.
    pub link_concurrency: usize,
    /// Per-link resolution timeout in seconds.
    pub link_timeout_secs: u64,
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            languages: config.defaults.languages.clone(),
            download_images: config.defaults.download_images,
            output_dir: PathBuf::from(&config.defaults.output_dir),
            math_style: config.defaults.math_style,
            api_url: config.source.api_url.clone(),
            source_timeout_secs: config.source.timeout_secs,
            link_concurrency: config.links.concurrency,
            link_timeout_secs: config.links.timeout_secs,
        }
    }
}

impl ConvertConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(WikiMdError::config("at least one language is required"));
        }
        if self.link_concurrency == 0 {
            return Err(WikiMdError::config("links.concurrency must be at least 1"));
        }
        if !self.api_url.contains(LANG_PLACEHOLDER) {
            return Err(WikiMdError::config(format!(
                "source.api_url must contain the {LANG_PLACEHOLDER} placeholder"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikimd/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| WikiMdError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikimd/wikimd.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| WikiMdError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WikiMdError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WikiMdError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WikiMdError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WikiMdError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

//! Application configuration for hexbridge.
//!
//! User config lives at `~/.hexbridge/hexbridge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HexbridgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "hexbridge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".hexbridge";

// ---------------------------------------------------------------------------
// Config structs (matching hexbridge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source (map app) settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Target (VTT) settings.
    #[serde(default)]
    pub target: TargetConfig,

    /// Fixed delays and timeouts used by the crawl.
    #[serde(default)]
    pub delays: DelaysConfig,
}

/// `[source]` section — where location pages live and how to recognize them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Absolute URL prefix a location link must carry.
    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,

    /// Path segment that marks a page as a location page.
    #[serde(default = "default_location_segment")]
    pub location_segment: String,

    /// Origin used to absolutize relative `sandbox/` links in notes text.
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_prefix: default_base_prefix(),
            location_segment: default_location_segment(),
            origin: default_origin(),
        }
    }
}

fn default_base_prefix() -> String {
    "https://5e.hexroll.app/sandbox/".into()
}
fn default_location_segment() -> String {
    "/location/".into()
}
fn default_origin() -> String {
    "https://5e.hexroll.app".into()
}

/// `[target]` section — where created entries and annotations land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Name of the root journal container (created when absent).
    #[serde(default = "default_root_journal")]
    pub root_journal: String,

    /// Annotation namespace on the target object.
    #[serde(default = "default_annotation_scope")]
    pub annotation_scope: String,

    /// Annotation slot within the namespace. Overwritten, never merged.
    #[serde(default = "default_annotation_key")]
    pub annotation_key: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            root_journal: default_root_journal(),
            annotation_scope: default_annotation_scope(),
            annotation_key: default_annotation_key(),
        }
    }
}

fn default_root_journal() -> String {
    "World".into()
}
fn default_annotation_scope() -> String {
    "gm-notes".into()
}
fn default_annotation_key() -> String {
    "notes".into()
}

/// `[delays]` section.
///
/// The millisecond values are empirically tuned against the source app's
/// client-side rendering speed; only the navigation timeout is a hard bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelaysConfig {
    /// Wait after load-complete before extracting, so client-side
    /// rendering can finish.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Wait between processing two linked locations.
    #[serde(default = "default_between_links_ms")]
    pub between_links_ms: u64,

    /// Wait before navigating the source tab back to the origin page.
    #[serde(default = "default_before_return_ms")]
    pub before_return_ms: u64,

    /// Wait between out-of-band fetches of location pages.
    #[serde(default = "default_fetch_politeness_ms")]
    pub fetch_politeness_ms: u64,

    /// Hard bound on a single tab navigation.
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            between_links_ms: default_between_links_ms(),
            before_return_ms: default_before_return_ms(),
            fetch_politeness_ms: default_fetch_politeness_ms(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
        }
    }
}

impl DelaysConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
    pub fn between_links(&self) -> Duration {
        Duration::from_millis(self.between_links_ms)
    }
    pub fn before_return(&self) -> Duration {
        Duration::from_millis(self.before_return_ms)
    }
    pub fn fetch_politeness(&self) -> Duration {
        Duration::from_millis(self.fetch_politeness_ms)
    }
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

fn default_settle_ms() -> u64 {
    1000
}
fn default_between_links_ms() -> u64 {
    500
}
fn default_before_return_ms() -> u64 {
    500
}
fn default_fetch_politeness_ms() -> u64 {
    300
}
fn default_navigation_timeout_secs() -> u64 {
    20
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.hexbridge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HexbridgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.hexbridge/hexbridge.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| HexbridgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HexbridgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HexbridgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HexbridgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HexbridgeError::io(&path, e))?;
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
        assert!(toml_str.contains("base_prefix"));
        assert!(toml_str.contains("root_journal"));
        assert!(toml_str.contains("navigation_timeout_secs"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.delays.settle_ms, 1000);
        assert_eq!(parsed.target.root_journal, "World");
        assert_eq!(parsed.source.location_segment, "/location/");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[target]
root_journal = "Campaign"

[delays]
settle_ms = 250
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.target.root_journal, "Campaign");
        assert_eq!(config.target.annotation_key, "notes");
        assert_eq!(config.delays.settle_ms, 250);
        assert_eq!(config.delays.navigation_timeout_secs, 20);
    }

    #[test]
    fn durations_convert() {
        let delays = DelaysConfig::default();
        assert_eq!(delays.settle(), Duration::from_millis(1000));
        assert_eq!(delays.navigation_timeout(), Duration::from_secs(20));
    }
}

//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tf_core::ChartLayout;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Trend chart size in SVG user units.
    pub chart_width: f64,
    pub chart_height: f64,
    pub chart_padding: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("chart_width", &self.chart_width)
            .field("chart_height", &self.chart_height)
            .field("chart_padding", &self.chart_padding)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let layout = ChartLayout::default();
        Self {
            database_path: data_dir.join("tf.db"),
            chart_width: layout.width,
            chart_height: layout.height,
            chart_padding: layout.padding,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TF_*)
        figment = figment.merge(Env::prefixed("TF_"));

        figment.extract()
    }

    pub const fn chart_layout(&self) -> ChartLayout {
        ChartLayout {
            width: self.chart_width,
            height: self.chart_height,
            padding: self.chart_padding,
        }
    }
}

/// Returns the platform-specific config directory for tf.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tf"))
}

/// Returns the platform-specific data directory for tf.
///
/// On Linux: `~/.local/share/tf`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tf"))
}

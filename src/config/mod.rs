// Configuration module

use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PhotomarkError;
use crate::watermark::{FontSource, WatermarkDefaults};

/// Prefix for environment overrides, e.g. `PHOTOMARK_LOGGING__FORMAT=json`.
pub const ENV_PREFIX: &str = "PHOTOMARK";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub watermark: WatermarkDefaults,
}

/// Ordered font candidates. The first one that loads wins; the built-in
/// bitmap font is used when none do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_font_candidates")]
    pub candidates: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: default_font_candidates(),
        }
    }
}

fn default_font_candidates() -> Vec<String> {
    [
        // macOS
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/Helvetica.ttc",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        // Linux
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        // Windows
        "C:\\Windows\\Fonts\\arial.ttf",
        "C:\\Windows\\Fonts\\msyh.ttc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output (default)
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `PHOTOMARK_*` environment variables.
    pub fn from_env() -> Result<Self, PhotomarkError> {
        Self::load_from(Self::environment())
    }

    /// Environment source with the naming rules used by [`AppConfig::from_env`].
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("fonts.candidates")
            .try_parsing(true)
    }

    /// Layer an environment source over the defaults and validate the result.
    pub fn load_from(env: Environment) -> Result<Self, PhotomarkError> {
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| PhotomarkError::Config(e.to_string()))?;

        let config: AppConfig = Config::builder()
            .add_source(defaults)
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PhotomarkError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PhotomarkError> {
        if self.logging.level.trim().is_empty() {
            return Err(PhotomarkError::Config(
                "logging.level cannot be empty".to_string(),
            ));
        }

        self.watermark.to_spec()?;

        Ok(())
    }

    /// Font sources to try, `extra` first, then the configured candidates.
    pub fn font_sources(&self, extra: &[PathBuf]) -> Vec<FontSource> {
        extra
            .iter()
            .cloned()
            .chain(self.fonts.candidates.iter().map(PathBuf::from))
            .map(FontSource::Path)
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String, PhotomarkError> {
        serde_yaml::to_string(self).map_err(|e| PhotomarkError::Config(e.to_string()))
    }
}

use std::path::Path;
use std::time::Duration;

use log::warn;

use crate::ai::{MinimaxAgent, DEFAULT_DEPTH};
use crate::error::ConfigError;
use crate::game::Player;

/// Deepest search the config accepts.
pub const MAX_DEPTH: u32 = 12;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub game: GameConfig,
}

/// How the computer searches.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched per computer move.
    pub depth: u32,
    /// When set, deepen iteratively up to `depth` and start no new ply
    /// after this many milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: DEFAULT_DEPTH,
            time_budget_ms: None,
        }
    }
}

impl SearchConfig {
    /// Build the computer player described by this config.
    pub fn agent(&self) -> MinimaxAgent {
        match self.time_budget_ms {
            Some(ms) => MinimaxAgent::with_time_budget(self.depth, Duration::from_millis(ms)),
            None => MinimaxAgent::new(self.depth),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub first_player: Player,
    /// Pause before the computer's piece is dropped.
    pub computer_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            first_player: Player::Human,
            computer_delay_ms: 500,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 || self.search.depth > MAX_DEPTH {
            return Err(ConfigError::Validation(format!(
                "search.depth must be in [1, {MAX_DEPTH}]"
            )));
        }
        if self.search.time_budget_ms == Some(0) {
            return Err(ConfigError::Validation(
                "search.time_budget_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

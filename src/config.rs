// Config - User configuration loaded from a RON file
// A missing file is not an error: every field has a default

use crate::sequencer::tempo::{DEFAULT_BPM, MAX_BPM, MIN_BPM, MIN_TEMPO_TAPS, is_valid_bpm};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "STEPDAW_CONFIG";

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "stepdaw";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// External program used to play samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub program: String,
    /// Arguments placed before the sample path
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: "aplay".to_string(),
            args: vec!["-q".to_string()],
        }
    }
}

/// An instrument created at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub sample: PathBuf,
    /// Step notation, see `Pattern::set_steps`
    #[serde(default)]
    pub rhythm: String,
}

impl InstrumentConfig {
    fn new(sample: &str, rhythm: String) -> Self {
        Self {
            sample: PathBuf::from(sample),
            rhythm,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_bpm: f64,
    pub min_tempo_taps: usize,
    pub player: PlayerConfig,
    /// Project file used by save/load; see [`Config::resolved_project_path`]
    pub project_path: Option<PathBuf>,
    pub samples: Vec<InstrumentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_bpm: DEFAULT_BPM,
            min_tempo_taps: MIN_TEMPO_TAPS,
            player: PlayerConfig::default(),
            project_path: None,
            samples: default_kit(),
        }
    }
}

impl Config {
    /// Load from `$STEPDAW_CONFIG`, else the platform config dir
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from(PathBuf::from(path)),
            None => match Self::default_path() {
                Some(path) => Self::load_from(path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config.sanitized())
    }

    /// Replace a default tempo that projects could not store
    pub fn sanitized(mut self) -> Self {
        if !is_valid_bpm(self.default_bpm) {
            log::warn!(
                "default_bpm {} is outside {}-{} BPM, using {}",
                self.default_bpm,
                MIN_BPM,
                MAX_BPM,
                DEFAULT_BPM
            );
            self.default_bpm = DEFAULT_BPM;
        }
        self
    }

    /// `<config_dir>/stepdaw/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.ron"))
    }

    /// Configured project path, else `<data_dir>/stepdaw/project.stepdaw`
    pub fn resolved_project_path(&self) -> Option<PathBuf> {
        self.project_path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join("project.stepdaw")))
    }
}

/// Four-piece startup kit
fn default_kit() -> Vec<InstrumentConfig> {
    vec![
        InstrumentConfig::new(
            "samples/kick.wav",
            "x     x     x     x               x     x   x   x x            ".to_string(),
        ),
        InstrumentConfig::new("samples/snare.wav", "        x       ".repeat(2)),
        InstrumentConfig::new("samples/hat.wav", "x ".repeat(16)),
        InstrumentConfig::new("samples/oh.wav", "    x   ".repeat(4)),
    ]
}

//! Configuration for the storywire daemon.
//!
//! Read from `~/.config/storywire/config.toml` when present. Every field has
//! a default, so a missing or partial file is fine; command-line flags are
//! layered on top by the caller.

pub mod sources;

pub use sources::{load_sources, parse_sources};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::canonical::{KindRegistry, SourceKind};
use crate::fetcher::{FETCH_TIMEOUT, MAX_ITEMS};
use crate::pipeline::{TaskSettings, DEFAULT_WORKERS};
use crate::store::{DEDUP_TTL, SCRAPER_QUEUE};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whitelist of feeds (`name,address,ignored,lang` per line).
    pub sources_file: Option<PathBuf>,
    pub endpoints: EndpointConfig,
    pub pipeline: PipelineConfig,
    pub schedule: ScheduleConfig,
    /// Source name to canonicalization kind, layered over the built-in table.
    pub kinds: BTreeMap<String, SourceKind>,
}

/// Where the queue and the dedup cache live. Either may be shared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub queue: Option<PathBuf>,
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub queue_name: String,
    pub workers: usize,
    pub max_items: usize,
    pub fetch_timeout_secs: u64,
    pub dedup_ttl_secs: u64,
    /// Per-task bound on the whole source task; 0 waits forever.
    pub task_deadline_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_name: SCRAPER_QUEUE.to_string(),
            workers: DEFAULT_WORKERS,
            max_items: MAX_ITEMS,
            fetch_timeout_secs: FETCH_TIMEOUT.as_secs(),
            dedup_ttl_secs: DEDUP_TTL.as_secs(),
            task_deadline_secs: 900,
        }
    }
}

impl PipelineConfig {
    pub fn task_settings(&self) -> TaskSettings {
        TaskSettings {
            max_items: self.max_items,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            dedup_ttl: Duration::from_secs(self.dedup_ttl_secs),
        }
    }

    pub fn task_deadline(&self) -> Option<Duration> {
        (self.task_deadline_secs > 0).then(|| Duration::from_secs(self.task_deadline_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub startup_delay_secs: u64,
    /// Sleep between the end of one cycle and the start of the next.
    pub cycle_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: 60,
            cycle_interval_secs: 1800,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// the file is there and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = Self::default_config_path()?;
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/storywire/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("storywire").join("config.toml"))
    }

    pub fn queue_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.endpoints.queue {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir()?.join("queue.db")),
        }
    }

    pub fn cache_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.endpoints.cache {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir()?.join("cache.db")),
        }
    }

    fn data_dir() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("storywire"))
    }

    pub fn kind_registry(&self) -> KindRegistry {
        KindRegistry::default().with_overrides(&self.kinds)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.schedule.startup_delay_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.cycle_interval_secs)
    }

    /// The commented default configuration file.
    pub fn default_config_content() -> String {
        r##"# storywire configuration

# Feed whitelist: one "name,address,ignored,lang" entry per line.
# sources_file = "/src/whitelist_urls.csv"

[endpoints]
# SQLite databases for the scraper queue and the seen-URL cache.
# They default to files under the platform data directory and may be the same file.
# queue = "/var/lib/storywire/queue.db"
# cache = "/var/lib/storywire/cache.db"

[pipeline]
queue_name = "scraper_queue"
# Source tasks running at once
workers = 30
# Entries read from each feed per cycle
max_items = 100
fetch_timeout_secs = 30
# Published URLs are suppressed for three days
dedup_ttl_secs = 259200
# Upper bound for one source task; 0 disables it
task_deadline_secs = 900

[schedule]
startup_delay_secs = 60
# Measured from the end of one cycle to the start of the next
cycle_interval_secs = 1800

[kinds]
# Canonicalization per source name: default, strip_quotes_ascii, ascii, world_prefix
xinhua = "strip_quotes_ascii"
upi = "ascii"
zaman = "world_prefix"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

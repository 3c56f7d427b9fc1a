//! Monitor settings persisted as `config.json`.

use {
    log::{info, warn},
    serde::{Deserialize, Serialize},
    std::{fs, io, ops::RangeInclusive, path::Path, time::Duration},
    thiserror::Error,
};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const SCORE_THRESHOLD_RANGE: RangeInclusive<i64> = 1..=100;
pub const POLLING_INTERVAL_RANGE: RangeInclusive<u64> = 5..=300;
pub const API_TIMEOUT_RANGE: RangeInclusive<u64> = 10..=120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("config file error: {0}")]
    Io(#[from] io::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tokens scoring strictly above this are LOW risk and get saved.
    pub score_threshold: i64,
    /// Seconds between discovery polls.
    pub polling_interval: u64,
    /// Per-request HTTP timeout in seconds.
    pub api_timeout: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            score_threshold: 81,
            polling_interval: 30,
            api_timeout: 30,
        }
    }
}

impl MonitorConfig {
    /// Reads the config at `path`.
    ///
    /// A missing file is created with the defaults. Unreadable or invalid
    /// content falls back to the defaults without touching the file, and
    /// values outside the edit bounds are clamped into them.
    pub fn load_or_init(path: &Path) -> MonitorConfig {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = MonitorConfig::default();
                match config.save(path) {
                    Ok(()) => info!("Created default config at {}", path.display()),
                    Err(e) => warn!("Could not write default config to {}: {}", path.display(), e),
                }
                return config;
            }
            Err(e) => {
                warn!("Could not read {}: {}, using defaults", path.display(), e);
                return MonitorConfig::default();
            }
        };
        match serde_json::from_str::<MonitorConfig>(&content) {
            Ok(config) => config.clamped(),
            Err(e) => {
                warn!("Invalid config in {}: {}, using defaults", path.display(), e);
                MonitorConfig::default()
            }
        }
    }

    fn clamped(self) -> MonitorConfig {
        MonitorConfig {
            score_threshold: clamp_field("score_threshold", self.score_threshold, &SCORE_THRESHOLD_RANGE),
            polling_interval: clamp_field("polling_interval", self.polling_interval, &POLLING_INTERVAL_RANGE),
            api_timeout: clamp_field("api_timeout", self.api_timeout, &API_TIMEOUT_RANGE),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }

    pub fn set_score_threshold(&mut self, value: i64) -> Result<(), ConfigError> {
        check_range("score_threshold", value, &SCORE_THRESHOLD_RANGE)?;
        self.score_threshold = value;
        Ok(())
    }

    pub fn set_polling_interval(&mut self, value: i64) -> Result<(), ConfigError> {
        check_range("polling_interval", value, &as_signed(&POLLING_INTERVAL_RANGE))?;
        self.polling_interval = value as u64;
        Ok(())
    }

    pub fn set_api_timeout(&mut self, value: i64) -> Result<(), ConfigError> {
        check_range("api_timeout", value, &as_signed(&API_TIMEOUT_RANGE))?;
        self.api_timeout = value as u64;
        Ok(())
    }
}

fn as_signed(range: &RangeInclusive<u64>) -> RangeInclusive<i64> {
    (*range.start() as i64)..=(*range.end() as i64)
}

fn clamp_field<T>(field: &str, value: T, range: &RangeInclusive<T>) -> T
where
    T: Copy + Ord + std::fmt::Display,
{
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!(
            "{} = {} in config is outside {}..={}, using {}",
            field,
            value,
            range.start(),
            range.end(),
            clamped
        );
    }
    clamped
}

fn check_range(field: &'static str, value: i64, range: &RangeInclusive<i64>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        value,
        min: *range.start(),
        max: *range.end(),
    })
}

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_AUTO_ADVANCE_MS: u64 = 2000;
const DEFAULT_RESUME_SAVE_SECS: u64 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No data directory available on this platform")]
    NoDataDir,
}

/// Application configuration
/// In debug builds: loads .env first, then reads LECTERN_* environment variables
/// In release builds: reads LECTERN_* environment variables only
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// File backing the key/value store (notes, resume positions)
    pub storage_path: Option<PathBuf>,
    /// Delay between completing a lesson and switching to the next one
    pub auto_advance_delay: Duration,
    /// Interval of the periodic resume-position flush
    pub resume_save_interval: Duration,
    /// JSON catalog replacing the embedded mock course
    pub course_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: None,
            auto_advance_delay: Duration::from_millis(DEFAULT_AUTO_ADVANCE_MS),
            resume_save_interval: Duration::from_secs(DEFAULT_RESUME_SAVE_SECS),
            course_path: None,
        }
    }
}

impl Config {
    /// Load configuration based on build mode
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                info!("Config: Dev mode activated - loaded .env file");
            } else {
                info!("Config: No .env file found, using environment and defaults");
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, test maps)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let auto_advance_delay = parse_u64(&lookup, "LECTERN_AUTO_ADVANCE_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.auto_advance_delay);

        let resume_save_interval = parse_u64(&lookup, "LECTERN_RESUME_SAVE_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.resume_save_interval);

        let storage_path = lookup("LECTERN_STORAGE_PATH").map(PathBuf::from);
        let course_path = lookup("LECTERN_COURSE_PATH").map(PathBuf::from);

        if let Some(path) = &storage_path {
            info!("Config: Storage path: {}", path.display());
        }
        if let Some(path) = &course_path {
            info!("Config: Course catalog override: {}", path.display());
        }

        Self {
            storage_path,
            auto_advance_delay,
            resume_save_interval,
            course_path,
        }
    }

    /// Resolve the storage file, falling back to the platform data directory
    pub fn resolve_storage_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("lectern").join("storage.json"))
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Config: Ignoring invalid {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.auto_advance_delay, Duration::from_millis(2000));
        assert_eq!(config.resume_save_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("LECTERN_AUTO_ADVANCE_MS", "500"),
            ("LECTERN_RESUME_SAVE_SECS", "10"),
            ("LECTERN_STORAGE_PATH", "/tmp/lectern/storage.json"),
        ]));
        assert_eq!(config.auto_advance_delay, Duration::from_millis(500));
        assert_eq!(config.resume_save_interval, Duration::from_secs(10));
        assert_eq!(
            config.resolve_storage_path().unwrap(),
            PathBuf::from("/tmp/lectern/storage.json")
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("LECTERN_AUTO_ADVANCE_MS", "soon"),
            ("LECTERN_RESUME_SAVE_SECS", "0"),
        ]));
        assert_eq!(config.auto_advance_delay, Duration::from_millis(2000));
        assert_eq!(config.resume_save_interval, Duration::from_secs(5));
    }
}

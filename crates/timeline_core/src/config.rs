//! Tracker configuration loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! store_path = "/var/lib/timeline/store.sqlite3"
//! log_level = "info"
//! log_dir = "/var/log/timeline"
//! upcoming_window_days = 7
//! ```

use crate::logging::default_log_level;
use crate::schedule::UPCOMING_WINDOW_DAYS;
use chrono::Duration;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidWindow(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidWindow(days) => {
                write!(f, "upcoming_window_days must be at least 1, got {days}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidWindow(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// SQLite file backing the table store; `None` runs unconfigured.
    pub store_path: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub upcoming_window_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            log_level: None,
            log_dir: None,
            upcoming_window_days: UPCOMING_WINDOW_DAYS,
        }
    }
}

impl TrackerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.upcoming_window_days < 1 {
            return Err(ConfigError::InvalidWindow(config.upcoming_window_days));
        }
        Ok(config)
    }

    /// Configured level, or the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn upcoming_window(&self) -> Duration {
        Duration::days(self.upcoming_window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackerConfig};
    use chrono::Duration;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.upcoming_window(), Duration::days(7));
    }

    #[test]
    fn load_reads_every_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "store_path = \"/tmp/store.sqlite3\"\nlog_level = \"warn\"\nupcoming_window_days = 3"
        )
        .unwrap();

        let config = TrackerConfig::load(file.path()).unwrap();
        assert_eq!(
            config.store_path.as_deref(),
            Some(std::path::Path::new("/tmp/store.sqlite3"))
        );
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.upcoming_window(), Duration::days(3));
    }

    #[test]
    fn rejects_unknown_keys_and_non_positive_window() {
        assert!(matches!(
            TrackerConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("upcoming_window_days = 0"),
            Err(ConfigError::InvalidWindow(0))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrackerConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

//! Optional YAML settings file.
//!
//! Every value can also come from a flag or environment variable; those
//! win over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lift_cloud::WaitConfig;

/// Image polling settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub max_attempts: Option<u32>,
    pub interval_secs: Option<u64>,
}

impl PollingConfig {
    /// Fill unset values from the defaults.
    pub fn wait_config(&self) -> WaitConfig {
        let defaults = WaitConfig::default();
        WaitConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            interval: self
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
        }
    }
}

/// Contents of `lift.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftConfig {
    pub destination_region: Option<String>,
    pub source_region: Option<String>,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub lock_table: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub audit_dir: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
    pub polling: PollingConfig,
}

impl LiftConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading settings from {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let config: LiftConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if one was given, otherwise use empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// First non-blank value, flag before file.
pub fn pick(flag: Option<String>, file: Option<&String>) -> Option<String> {
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| file.filter(|v| !v.trim().is_empty()).cloned())
}

/// Flag path, else file path, else a default.
pub fn pick_dir(flag: Option<PathBuf>, file: Option<&PathBuf>, default: &str) -> PathBuf {
    flag.or_else(|| file.cloned())
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lift.yaml");
        fs::write(
            &path,
            "destination_region: eu-west-1\nbucket: tf-state\npolling:\n  max_attempts: 5\n",
        )
        .unwrap();

        let config = LiftConfig::from_file(&path).unwrap();
        assert_eq!(config.destination_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.bucket.as_deref(), Some("tf-state"));
        assert!(config.key.is_none());

        let wait = config.polling.wait_config();
        assert_eq!(wait.max_attempts, 5);
        assert_eq!(wait.interval, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(LiftConfig::load(Some(dir.path().join("absent.yaml").as_path())).is_err());
        assert_eq!(LiftConfig::load(None).unwrap(), LiftConfig::default());
    }

    #[test]
    fn test_flag_wins_over_file() {
        let file = Some("from-file".to_string());
        assert_eq!(pick(Some("flag".into()), file.as_ref()).as_deref(), Some("flag"));
        assert_eq!(pick(Some(" ".into()), file.as_ref()).as_deref(), Some("from-file"));
        assert_eq!(pick(None, None), None);
        assert_eq!(pick_dir(None, None, "terraform"), PathBuf::from("terraform"));
    }
}

//! Remote-state backend settings.

use serde::{Deserialize, Serialize};

/// Named external settings for the S3 backend.
///
/// The values are opaque; they are only checked for blankness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub lock_table: Option<String>,
}

impl BackendSettings {
    pub fn new(
        bucket: Option<String>,
        key: Option<String>,
        lock_table: Option<String>,
    ) -> Self {
        Self {
            bucket,
            key,
            lock_table,
        }
    }

    /// Backend emission is requested when any setting is non-blank.
    pub fn is_requested(&self) -> bool {
        [&self.bucket, &self.key, &self.lock_table]
            .iter()
            .any(|v| !is_blank(v))
    }

    /// Names of the settings that are blank, including the region.
    pub fn missing(&self, region: &str) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.bucket) {
            missing.push("bucket");
        }
        if is_blank(&self.key) {
            missing.push("key");
        }
        if region.trim().is_empty() {
            missing.push("region");
        }
        if is_blank(&self.lock_table) {
            missing.push("lock_table");
        }
        missing
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_requested_when_all_blank() {
        let settings = BackendSettings::new(None, Some("  ".to_string()), None);
        assert!(!settings.is_requested());
    }

    #[test]
    fn test_partial_settings_report_missing() {
        let settings = BackendSettings::new(Some("state-bucket".to_string()), None, Some(String::new()));
        assert!(settings.is_requested());
        assert_eq!(settings.missing("eu-west-1"), vec!["key", "lock_table"]);
        assert_eq!(settings.missing(""), vec!["key", "region", "lock_table"]);
    }
}

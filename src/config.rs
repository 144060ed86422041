//! JSON configuration for the submission workflow.
//!
//! ```json
//! {
//!   "flag_threshold": 25.0,
//!   "max_upload_bytes": 10485760,
//!   "log_filter": "info"
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults above.

use crate::error::{ParaprintError, Result};
use crate::extract::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the registry root when no path is given.
pub const CONFIG_FILE: &str = "paraprint.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Similarity percentage above which a submission is flagged.
    #[serde(default = "default_flag_threshold")]
    pub flag_threshold: f64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_flag_threshold() -> f64 {
    25.0
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flag_threshold: default_flag_threshold(),
            max_upload_bytes: default_max_upload_bytes(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| ParaprintError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `paraprint.json` from `root` if present, else the defaults.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.flag_threshold) {
            return Err(ParaprintError::Config(format!(
                "flag_threshold must be within 0..=100, got {}",
                self.flag_threshold
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ParaprintError::Config(
                "max_upload_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::default().flag_threshold, 25.0);
        assert_eq!(Config::default().max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn partial_override() {
        let cfg = Config::from_json(r#"{ "flag_threshold": 40 }"#).unwrap();
        assert_eq!(cfg.flag_threshold, 40.0);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(matches!(
            Config::from_json(r#"{ "flag_threshold": 120 }"#),
            Err(ParaprintError::Config(_))
        ));
        assert!(Config::from_json(r#"{ "max_upload_bytes": 0 }"#).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(Config::from_json(r#"{ "treshold": 10 }"#).is_err());
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(tmp.path()).unwrap(), Config::default());

        fs::write(tmp.path().join(CONFIG_FILE), r#"{ "log_filter": "debug" }"#).unwrap();
        assert_eq!(Config::discover(tmp.path()).unwrap().log_filter, "debug");
    }
}

//! Configuration module
//!
//! Staging, permanent storage and probe settings, read from the environment
//! with defaults applied when a variable is unset.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const TEMP_UPLOAD_DIR: &str = "./uploads/temp";
const AUDIO_STORAGE_DIR: &str = "./uploads/audio";
const FFPROBE_PATH: &str = "ffprobe";
const PROBE_TIMEOUT_SECS: u64 = 30;
const TEMP_FILE_TTL_SECS: u64 = 24 * 60 * 60;
const CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// Temporary-upload subsystem configuration
#[derive(Clone, Debug)]
pub struct StagingConfig {
    /// Directory holding uploaded-but-uncommitted files
    pub temp_dir: PathBuf,
    /// Directory promoted files are moved into
    pub storage_dir: PathBuf,
    pub ffprobe_path: String,
    /// Hard wall-clock budget for a single probe invocation
    pub probe_timeout: Duration,
    /// Age after which a staged file is considered abandoned
    pub temp_file_ttl: Duration,
    pub cleanup_interval: Duration,
    pub environment: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from(TEMP_UPLOAD_DIR),
            storage_dir: PathBuf::from(AUDIO_STORAGE_DIR),
            ffprobe_path: FFPROBE_PATH.to_string(),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            temp_file_ttl: Duration::from_secs(TEMP_FILE_TTL_SECS),
            cleanup_interval: Duration::from_secs(CLEANUP_INTERVAL_SECS),
            environment: "development".to_string(),
        }
    }
}

impl StagingConfig {
    /// Load configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        Self {
            temp_dir: lookup("TEMP_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(TEMP_UPLOAD_DIR)),
            storage_dir: lookup("AUDIO_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(AUDIO_STORAGE_DIR)),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| FFPROBE_PATH.to_string()),
            probe_timeout: Duration::from_secs(secs("PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)),
            temp_file_ttl: Duration::from_secs(secs("TEMP_FILE_TTL_SECS", TEMP_FILE_TTL_SECS)),
            cleanup_interval: Duration::from_secs(secs(
                "CLEANUP_INTERVAL_SECS",
                CLEANUP_INTERVAL_SECS,
            )),
            environment,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.temp_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("TEMP_UPLOAD_DIR cannot be empty"));
        }
        if self.storage_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("AUDIO_STORAGE_DIR cannot be empty"));
        }
        if self.temp_dir == self.storage_dir {
            return Err(anyhow::anyhow!(
                "TEMP_UPLOAD_DIR and AUDIO_STORAGE_DIR must be different directories"
            ));
        }
        if self.ffprobe_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFPROBE_PATH cannot be empty"));
        }
        if self.probe_timeout.is_zero() {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECS must be greater than 0"));
        }
        if self.temp_file_ttl.is_zero() {
            return Err(anyhow::anyhow!("TEMP_FILE_TTL_SECS must be greater than 0"));
        }
        if self.cleanup_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "CLEANUP_INTERVAL_SECS must be greater than 0"
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StagingConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.temp_dir, PathBuf::from("./uploads/temp"));
        assert_eq!(config.storage_dir, PathBuf::from("./uploads/audio"));
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
        assert_eq!(config.temp_file_ttl, Duration::from_secs(86400));
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = StagingConfig::from_lookup(lookup_from(&[
            ("TEMP_UPLOAD_DIR", "/srv/stage"),
            ("AUDIO_STORAGE_DIR", "/srv/audio"),
            ("FFPROBE_PATH", "/usr/local/bin/ffprobe"),
            ("PROBE_TIMEOUT_SECS", "5"),
            ("TEMP_FILE_TTL_SECS", "600"),
            ("APP_ENV", "prod"),
        ]));
        assert_eq!(config.temp_dir, PathBuf::from("/srv/stage"));
        assert_eq!(config.storage_dir, PathBuf::from("/srv/audio"));
        assert_eq!(config.ffprobe_path, "/usr/local/bin/ffprobe");
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.temp_file_ttl, Duration::from_secs(600));
        assert!(config.is_production());
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config =
            StagingConfig::from_lookup(lookup_from(&[("PROBE_TIMEOUT_SECS", "thirty")]));
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = StagingConfig::from_lookup(lookup_from(&[("PROBE_TIMEOUT_SECS", "0")]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_directory() {
        let config = StagingConfig::from_lookup(lookup_from(&[
            ("TEMP_UPLOAD_DIR", "/data"),
            ("AUDIO_STORAGE_DIR", "/data"),
        ]));
        assert!(config.validate().is_err());
    }
}

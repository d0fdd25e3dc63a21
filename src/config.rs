//! Configuration management for the `AirMap` job
//!
//! Everything comes from the process environment. The configuration is
//! assembled once per run and passed down to every stage.

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::JobError;

pub const API_TOKEN_VAR: &str = "API_TOKEN";
pub const BUCKET_VAR: &str = "STORAGE_BUCKET_NAME";
pub const POINTS_API_URL_VAR: &str = "POINTS_API_URL";
pub const OBJECT_KEY_VAR: &str = "OBJECT_KEY";
pub const SCRATCH_PATH_VAR: &str = "SCRATCH_PATH";
pub const MAP_TIMEZONE_VAR: &str = "MAP_TIMEZONE";
pub const HTTP_TIMEOUT_VAR: &str = "HTTP_TIMEOUT_SECONDS";

/// Root configuration of a single run
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Points API configuration
    pub api: ApiConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Time zone used for the map title
    pub timezone: Tz,
}

/// Points API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bearer token, never empty
    pub token: String,
    /// Endpoint listing the points
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Target bucket, checked only when uploading
    pub bucket: Option<String>,
    /// Object key the map is stored under
    pub object_key: String,
    /// Local file the map is written to before upload
    pub scratch_path: PathBuf,
}

fn default_base_url() -> String {
    "https://api.inpost.pl/v1/points".to_string()
}

fn default_object_key() -> String {
    "index.html".to_string()
}

fn default_scratch_path() -> PathBuf {
    PathBuf::from("/tmp/index.html")
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Warsaw
}

fn default_timeout() -> u64 {
    30
}

impl JobConfig {
    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, JobError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        // the token is passed through verbatim, only an empty value is missing
        let token = lookup(API_TOKEN_VAR)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                JobError::config(format!("{API_TOKEN_VAR} environment variable not set."))
            })?;

        let timezone = match read(MAP_TIMEZONE_VAR) {
            Some(name) => name.parse::<Tz>().map_err(|_| {
                JobError::config(format!("Invalid {MAP_TIMEZONE_VAR} '{name}'"))
            })?,
            None => default_timezone(),
        };

        let timeout_seconds = match read(HTTP_TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                JobError::config(format!("{HTTP_TIMEOUT_VAR} must be a number, got '{raw}'"))
            })?,
            None => default_timeout(),
        };

        let config = Self {
            api: ApiConfig {
                token,
                base_url: read(POINTS_API_URL_VAR).unwrap_or_else(default_base_url),
                timeout_seconds,
            },
            storage: StorageConfig {
                bucket: read(BUCKET_VAR),
                object_key: read(OBJECT_KEY_VAR).unwrap_or_else(default_object_key),
                scratch_path: read(SCRATCH_PATH_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(default_scratch_path),
            },
            timezone,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the optional overrides
    pub fn validate(&self) -> Result<(), JobError> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(JobError::config(
                "Points API URL must be a valid HTTP or HTTPS URL",
            ));
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            return Err(JobError::config(
                "HTTP timeout must be between 1 and 300 seconds",
            ));
        }

        if self.storage.object_key.starts_with('/') {
            return Err(JobError::config("Object key must not start with '/'"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = JobConfig::from_lookup(lookup(&[(API_TOKEN_VAR, "secret")])).unwrap();
        assert_eq!(config.api.token, "secret");
        assert_eq!(config.api.base_url, "https://api.inpost.pl/v1/points");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.storage.object_key, "index.html");
        assert_eq!(config.storage.scratch_path, PathBuf::from("/tmp/index.html"));
        assert_eq!(config.timezone, chrono_tz::Europe::Warsaw);
        assert!(config.storage.bucket.is_none());
    }

    #[test]
    fn test_missing_token() {
        let err = JobConfig::from_lookup(lookup(&[(BUCKET_VAR, "maps")])).unwrap_err();
        assert!(matches!(err, JobError::Config { .. }));
        assert_eq!(err.status_code(), 500);
        assert!(err.response_body().contains("API_TOKEN"));
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let err = JobConfig::from_lookup(lookup(&[(API_TOKEN_VAR, "")])).unwrap_err();
        assert!(matches!(err, JobError::Config { .. }));
    }

    #[test]
    fn test_whitespace_token_is_kept_verbatim() {
        let config = JobConfig::from_lookup(lookup(&[(API_TOKEN_VAR, "  ")])).unwrap();
        assert_eq!(config.api.token, "  ");

        let config = JobConfig::from_lookup(lookup(&[(API_TOKEN_VAR, " abc\n")])).unwrap();
        assert_eq!(config.api.token, " abc\n");
    }

    #[test]
    fn test_bucket_is_not_validated() {
        let config = JobConfig::from_lookup(lookup(&[
            (API_TOKEN_VAR, "secret"),
            (BUCKET_VAR, "not a valid bucket!"),
        ]))
        .unwrap();
        assert_eq!(config.storage.bucket.as_deref(), Some("not a valid bucket!"));
    }

    #[test]
    fn test_overrides() {
        let config = JobConfig::from_lookup(lookup(&[
            (API_TOKEN_VAR, "secret"),
            (POINTS_API_URL_VAR, "http://localhost:9000/v1/points"),
            (OBJECT_KEY_VAR, "maps/air.html"),
            (SCRATCH_PATH_VAR, "/var/tmp/air.html"),
            (MAP_TIMEZONE_VAR, "UTC"),
            (HTTP_TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000/v1/points");
        assert_eq!(config.storage.object_key, "maps/air.html");
        assert_eq!(config.storage.scratch_path, PathBuf::from("/var/tmp/air.html"));
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.api.timeout_seconds, 5);
    }

    #[test]
    fn test_invalid_overrides() {
        let result = JobConfig::from_lookup(lookup(&[
            (API_TOKEN_VAR, "secret"),
            (POINTS_API_URL_VAR, "ftp://example.com"),
        ]));
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));

        let result = JobConfig::from_lookup(lookup(&[
            (API_TOKEN_VAR, "secret"),
            (MAP_TIMEZONE_VAR, "Mars/Olympus"),
        ]));
        assert!(result.unwrap_err().to_string().contains(MAP_TIMEZONE_VAR));

        let result = JobConfig::from_lookup(lookup(&[
            (API_TOKEN_VAR, "secret"),
            (HTTP_TIMEOUT_VAR, "500"),
        ]));
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }
}

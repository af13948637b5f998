//! Tap configuration
//!
//! The config file is a flat JSON object. Older deployments used the
//! upper-case `API_KEY` / `API_URL` keys, which are still accepted.

use crate::error::{Error, Result};
use crate::types::ReplicationMethod;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default Forecast API root
pub const DEFAULT_API_URL: &str = "https://api.forecast.it/api/v1/";

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "X-FORECAST-API-KEY";

/// Runtime configuration for a discover or sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Forecast API key
    #[serde(alias = "API_KEY", default)]
    pub api_key: String,

    /// Earliest replication-key value a run will emit
    #[serde(default)]
    pub start_date: String,

    /// API root that stream paths are joined onto
    #[serde(alias = "API_URL", default = "default_api_url")]
    pub api_url: String,

    /// Forces every stream onto one replication method
    #[serde(default)]
    pub rewrite_replication_method: Option<ReplicationMethod>,

    /// Client-side rate limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Retries for 429/5xx/timeouts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_rps() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

impl TapConfig {
    /// Build and validate a config from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("Config must be a JSON object"));
        }
        let config: TapConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Check required keys and value formats
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        if self.start_date.trim().is_empty() {
            return Err(Error::missing_field("start_date"));
        }
        parse_start_date(&self.start_date)?;

        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;

        if self.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The start date as a UTC timestamp
    pub fn start_datetime(&self) -> Result<DateTime<Utc>> {
        parse_start_date(&self.start_date)
    }
}

/// Accepts full RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates
fn parse_start_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::invalid_value("start_date", format!("'{raw}' is not ISO 8601")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config() {
        let config = TapConfig::from_value(json!({
            "api_key": "secret",
            "start_date": "2020-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.max_retries, 3);
        assert!(config.rewrite_replication_method.is_none());
    }

    #[test]
    fn test_legacy_upper_case_keys() {
        let config = TapConfig::from_json(
            r#"{"API_KEY": "k", "API_URL": "https://example.test/api/", "start_date": "2021-03-04"}"#,
        )
        .unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.api_url, "https://example.test/api/");
        assert_eq!(
            config.start_datetime().unwrap().to_rfc3339(),
            "2021-03-04T00:00:00+00:00"
        );
    }

    #[test]
    fn test_rewrite_replication_method() {
        let config = TapConfig::from_value(json!({
            "api_key": "k",
            "start_date": "2020-01-01T00:00:00Z",
            "rewrite_replication_method": "FULL_TABLE"
        }))
        .unwrap();

        assert_eq!(
            config.rewrite_replication_method,
            Some(ReplicationMethod::FullTable)
        );
    }

    #[test]
    fn test_missing_api_key() {
        let err = TapConfig::from_value(json!({"start_date": "2020-01-01"})).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "api_key"));
    }

    #[test]
    fn test_missing_start_date() {
        let err = TapConfig::from_value(json!({"api_key": "k"})).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "start_date"));
    }

    #[test]
    fn test_invalid_start_date() {
        let err = TapConfig::from_value(json!({"api_key": "k", "start_date": "last tuesday"}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { field, .. } if field == "start_date"));
    }

    #[test]
    fn test_non_object_config() {
        assert!(matches!(
            TapConfig::from_value(json!(["api_key"])),
            Err(Error::Config { .. })
        ));
    }
}

//! Common types used throughout tap-forecast
//!
//! Shared enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream decides which records are new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Compare against the stream's rolling bookmark
    #[default]
    Incremental,
    /// Compare against the configured start date only
    FullTable,
}

impl ReplicationMethod {
    /// Protocol name of the method
    pub fn as_str(self) -> &'static str {
        match self {
            ReplicationMethod::Incremental => "INCREMENTAL",
            ReplicationMethod::FullTable => "FULL_TABLE",
        }
    }
}

impl fmt::Display for ReplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplicationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INCREMENTAL" => Ok(ReplicationMethod::Incremental),
            "FULL_TABLE" => Ok(ReplicationMethod::FullTable),
            other => Err(format!("unknown replication method '{other}'")),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_method_serde() {
        let method: ReplicationMethod = serde_json::from_str("\"FULL_TABLE\"").unwrap();
        assert_eq!(method, ReplicationMethod::FullTable);

        let json = serde_json::to_string(&ReplicationMethod::Incremental).unwrap();
        assert_eq!(json, "\"INCREMENTAL\"");
    }

    #[test]
    fn test_replication_method_from_str() {
        assert_eq!(
            "incremental".parse::<ReplicationMethod>(),
            Ok(ReplicationMethod::Incremental)
        );
        assert_eq!(
            "FULL_TABLE".parse::<ReplicationMethod>(),
            Ok(ReplicationMethod::FullTable)
        );
        assert!("LOG_BASED".parse::<ReplicationMethod>().is_err());
    }

    #[test]
    fn test_backoff_default() {
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }
}

//! # Error Types
//!
//! Custom error types for Plan To WPL using `thiserror`.

use thiserror::Error;

/// Main error type for Plan To WPL
#[derive(Debug, Error)]
pub enum PlanToWplError {
    /// A configuration value is outside its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Home override is not 2 or 3 numeric values
    #[error("Invalid home override: {0}")]
    InvalidHomeOverride(String),

    /// No home override given and the mission has no planned home position
    #[error(
        "No \"plannedHomePosition\" found in mission, set it in QGroundControl or pass a home override"
    )]
    MissingHome,

    /// Home altitude must be backfilled but the mission holds no waypoint
    #[error("Mission contains no navigation waypoint to take the home altitude from")]
    NoWaypoint,

    /// Mission JSON is missing required structure
    #[error("Malformed mission: {0}")]
    MalformedMission(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Mission file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Plan To WPL
pub type Result<T> = std::result::Result<T, PlanToWplError>;

//! Error type for trail setup and configuration.
//!
//! Physics and geometry never fail; only setup-time work (config files,
//! handle lookups) can produce a [`TrailError`].

use std::io;
use thiserror::Error;

/// Errors that can occur while configuring or addressing trails.
#[derive(Debug, Error)]
pub enum TrailError {
    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid JSON for [`TrailConfig`](crate::TrailConfig)
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of its accepted range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Trail handle does not belong to this set
    #[error("Unknown trail #{0}")]
    UnknownTrail(usize),

    /// Group handle does not belong to this set
    #[error("Unknown trail group #{0}")]
    UnknownGroup(usize),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TrailError>;

//! Crate error types
//!
//! The simulation itself never fails; these cover configuration and
//! listener callbacks.

use thiserror::Error;

/// Cat Billiards error type
#[derive(Debug, Error)]
pub enum Error {
    /// Physics settings out of range
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Table layout cannot produce a playable table
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// An event or stop listener reported a failure
    #[error("listener failed: {0}")]
    Listener(String),

    /// Config (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

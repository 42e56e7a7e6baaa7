//! Error types for the simulation core

use thiserror::Error;

/// Simulation errors
///
/// Collision outcomes are not errors; they come back as a
/// [`Resolution`](super::collision::Resolution).
#[derive(Debug, Error)]
pub enum SimError {
    /// A traversal or removal was attempted on an empty object list
    #[error("`{op}` called on an empty object list")]
    EmptyList { op: &'static str },

    /// Settings JSON could not be parsed
    #[error("invalid settings JSON: {0}")]
    Config(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// A setting parsed but holds an unusable value
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

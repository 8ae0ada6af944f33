// Typed errors with thiserror. Only construction can fail; navigation never does.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pager needs at least one section")]
    EmptyPager,

    #[error("Section id count {ids} does not match section count {count}")]
    SectionIdMismatch { ids: usize, count: usize },

    #[error("Setting `{name}` must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

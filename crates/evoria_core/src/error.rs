//! Error types for the simulation engine.
//!
//! The taxonomy follows the error kinds the pipeline must distinguish:
//! invariant violations are fatal to a turn, everything else is recovered
//! locally by the stage that raised it.

use thiserror::Error;

/// Main error type for `evoria_core` operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A committed-state invariant was violated (negative population,
    /// trophic range exceeded, ...). Fatal: the turn rolls back.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// AI-sourced content failed validation. Never fatal; the rules
    /// engine synthesises a fallback.
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// An AI call, embedding call, or vector kernel exceeded its budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Suitability sums collapsed to near zero after cumulative
    /// migrations; recovered by recomputing habitat from tiles.
    #[error("data drift: {0}")]
    DataDrift(String),

    /// A population or capacity computation produced infinity or NaN.
    #[error("capacity overflow: {0}")]
    CapacityOverflow(String),

    /// A config value failed to load or validate. Fatal at startup only.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config parse errors.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Generic error with context, for wrapping a lower error with a
    /// higher-level explanation.
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<EngineError>,
    },
}

/// Result type alias for `evoria_core` operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    #[must_use]
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::Invariant(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::ValidationFailure(msg.into())
    }

    #[must_use]
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    #[must_use]
    pub fn data_drift<S: Into<String>>(msg: S) -> Self {
        Self::DataDrift(msg.into())
    }

    #[must_use]
    pub fn capacity_overflow<S: Into<String>>(msg: S) -> Self {
        Self::CapacityOverflow(msg.into())
    }

    #[must_use]
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True if this error kind is one a stage should recover from locally
    /// rather than fail the turn over (spec §7 kinds 2-5).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Invariant(_) | EngineError::Configuration(_))
    }
}

/// Outcome of a single pipeline stage, threaded through the turn report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StageOutcome {
    Ok,
    Skipped(String),
    Failed(String),
}

impl StageOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok)
    }
}

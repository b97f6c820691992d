//! Error types for `evoria_observer`. Matches the error kinds from spec §7
//! that actually originate at the AI/embedding boundary: validation
//! failure and timeout. Everything else is a fatal engine-level concern
//! handled by `evoria_core::EngineError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("validation failure: {0}")]
    Validation(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, ObserverError>;

impl ObserverError {
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }
}

//! Shared error type across Kai SDK crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, KaiError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum KaiError {
    /// Structurally invalid message or fragment. Carries the raw input so
    /// callers can log it. Data-path code recovers from this locally by
    /// dropping the offending message or fragment; it is never fatal.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// `connect` was called before `initialise`.
    #[error("module not initialised")]
    NotInitialised,

    /// `set_capabilities` was called before the service acknowledged
    /// authentication.
    #[error("module not authenticated")]
    NotAuthenticated,

    /// The transport failed to transmit a frame.
    #[error("transport: {0}")]
    Transport(String),

    /// Invalid module configuration.
    #[error("config: {0}")]
    Config(String),
}

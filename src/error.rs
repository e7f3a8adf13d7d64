//! Error taxonomy for the dispatch engine.
//!
//! Only [`ConfigError`] is allowed to abort the process, and only at startup.
//! Everything else is contained within the request that produced it and ends
//! up as an error envelope on the wire.

use http::Method;
use thiserror::Error;

/// Startup-time configuration failures. Fatal: the process must not serve.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `start` was called on a registry that already registered its routes.
    #[error("registry for api v{version} was already initialized")]
    AlreadyInitialized { version: u32 },

    /// A registry was started without any operations.
    #[error("registry for api v{version} declares no operations")]
    NoOperationsDeclared { version: u32 },

    /// Two operations claim the same verb and versioned path.
    #[error("duplicate route {method} {path} (operations `{existing}` and `{duplicate}`)")]
    DuplicateRoute {
        method: Method,
        path: String,
        existing: String,
        duplicate: String,
    },

    /// A path template that cannot be registered.
    #[error("invalid path template `{template}`: {reason}")]
    InvalidPathTemplate {
        template: String,
        reason: &'static str,
    },
}

/// Per-request failures while aligning raw parameters with an operation's
/// declared parameter list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("expected at most {expected} parameters, received {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("parameter {position} (`{name}`) expects an integer, got `{value}`")]
    InvalidArgumentType {
        position: usize,
        name: String,
        value: String,
    },

    #[error("parameter {position} (`{name}`) is required")]
    MissingRequiredParameter { position: usize, name: String },
}

/// Raised by handlers when reading a bound argument with the wrong accessor.
///
/// Surfaces through the invoker as a synchronous handler failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("no argument at position {0}")]
    OutOfRange(usize),

    #[error("argument {position} is not {expected}")]
    WrongType {
        position: usize,
        expected: &'static str,
    },

    #[error("argument {0} is null")]
    Null(usize),
}

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::coordinate::CoordinateRole;

/// Convenient result alias for the vroomapi library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a coordinate does not split into exactly two components.
    #[error("Need both longitude and latitude for {}: {input}", .role.label())]
    InvalidCoordinateFormat { role: CoordinateRole, input: String },

    /// Raised when a coordinate component is not a finite decimal number.
    #[error("Invalid {}: {input}", .role.label())]
    InvalidCoordinateValue { role: CoordinateRole, input: String },

    /// Raised when a required query parameter was not supplied.
    #[error("Required parameter '{name}' is missing")]
    MissingParameter { name: String },

    /// Raised when a non-coordinate query parameter has an unusable value.
    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: String, value: String },

    /// The configured optimizer binary does not exist.
    #[error("VROOM binary file doesn't exist: {path}")]
    BinaryUnavailable { path: PathBuf },

    /// The configured optimizer binary exists but cannot be executed.
    #[error("Cannot execute VROOM binary file: {path}")]
    BinaryNotExecutable { path: PathBuf },

    /// The optimizer process could not be started or ended in an unreadable state.
    #[error("failed to run VROOM binary: {message}")]
    ProcessInvocation { message: String },

    /// The optimizer process exceeded the configured runtime and was killed.
    #[error("VROOM binary did not finish within {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// The optimizer reported a failure on its own output streams.
    #[error("Error output from VROOM binary: {message}")]
    OptimizerReported { message: String },

    /// Standard output was expected to be JSON but could not be parsed.
    #[error("malformed output from VROOM binary: {message}")]
    MalformedOutput { message: String },

    /// The compute request could not be serialized.
    #[error("failed to serialize compute request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input; nothing was spawned.
    Validation,
    /// The optimizer binary is missing or misconfigured.
    Configuration,
    /// The process could not be run to completion.
    Invocation,
    /// The optimizer ran and signaled failure.
    Optimizer,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCoordinateFormat { .. }
            | Error::InvalidCoordinateValue { .. }
            | Error::MissingParameter { .. }
            | Error::InvalidParameter { .. } => ErrorKind::Validation,
            Error::BinaryUnavailable { .. } | Error::BinaryNotExecutable { .. } => {
                ErrorKind::Configuration
            }
            Error::ProcessInvocation { .. }
            | Error::Timeout { .. }
            | Error::Serialize(_)
            | Error::Io(_) => ErrorKind::Invocation,
            Error::OptimizerReported { .. } | Error::MalformedOutput { .. } => {
                ErrorKind::Optimizer
            }
        }
    }

    /// True when the failure was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Short, stable label suitable for metric dimensions.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InvalidCoordinateFormat { .. } | Error::InvalidCoordinateValue { .. } => {
                "invalid_coordinate"
            }
            Error::MissingParameter { .. } | Error::InvalidParameter { .. } => "invalid_parameter",
            Error::BinaryUnavailable { .. } => "binary_unavailable",
            Error::BinaryNotExecutable { .. } => "binary_not_executable",
            Error::ProcessInvocation { .. } | Error::Io(_) | Error::Serialize(_) => {
                "invocation_failed"
            }
            Error::Timeout { .. } => "timeout",
            Error::OptimizerReported { .. } => "optimizer_error",
            Error::MalformedOutput { .. } => "malformed_output",
        }
    }
}

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Cannot interpret positional arguments: {reason}")]
    AmbiguousInputs { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

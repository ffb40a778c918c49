use thiserror::Error;

/// Errors produced while parsing and validating a settings document.
///
/// Configuration errors are never recovered from automatically: they are
/// surfaced to the operator, who fixes the source document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not well-formed per the block/attribute grammar.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A required field is missing, empty, duplicated, or has the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A version constraint is unrecognized or unsatisfiable.
    #[error("constraint error: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum TfcheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

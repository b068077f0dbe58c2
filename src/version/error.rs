use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Version string is empty")]
    Empty,

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid version range: {0}")]
    InvalidRange(String),

    #[error("Invalid floating version: {0}")]
    InvalidFloat(String),

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),
}

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Invalid version constraint '{constraint}': {source}")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: ParseError,
    },

    #[error("Version resolution was cancelled")]
    Cancelled,
}

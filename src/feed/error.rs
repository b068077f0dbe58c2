use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Feed query was cancelled")]
    Cancelled,
}

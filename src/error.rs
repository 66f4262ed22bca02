//! Error types for the content pipeline

use thiserror::Error;

/// Errors raised while fetching, transforming or paginating content
#[derive(Error, Debug)]
pub enum Error {
    #[error("No {doc_type} document with uid '{uid}'")]
    NotFound { doc_type: String, uid: String },

    #[error("Document {id} has an invalid publication date: {reason}")]
    InvalidDate { id: String, reason: String },

    #[error("Document {id} is malformed: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Content source request failed: {0}")]
    TransientFetch(String),

    #[error("A page load is already in flight")]
    ConcurrentLoadRejected,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::TransientFetch(err.to_string())
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

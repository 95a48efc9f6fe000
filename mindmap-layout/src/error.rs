//! Errors at the host boundary. The layout engine itself is total.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid layout request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("failed to encode layout output: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for taskflow.
//!
//! These are process-level failures. An invalid task is not an error here:
//! it is a normal outcome carried on the task record as [`TaskError`].
//!
//! [`TaskError`]: crate::model::TaskError

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} channel closed while a producer was still sending")]
    ChannelClosed(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pipeline unit failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Pipeline error type.
//!
//! Every stage propagates through `PipelineError`; the first failure
//! aborts the batch and fails the CI run with the message in the logs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing AWS credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("no S3 bucket configured (set S3_BUCKET_NAME or storage.bucket)")]
    MissingBucket,

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("git diff failed: {0}")]
    Diff(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

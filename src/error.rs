use thiserror::Error;

/// Fatal errors that abort a capture. Everything else (short reads, writer
/// backpressure, integration underflow, config edit failures) is absorbed
/// locally by the component that observes it and never reaches here.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no SDR device present: {0}")]
    SdrInit(String),

    #[error("failed to create temp data directory {path}: {source}")]
    TempDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("disk write failure writing {path}: {source}")]
    DiskWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CaptureError>;

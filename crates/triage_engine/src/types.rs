use std::path::PathBuf;

use thiserror::Error;

use crate::api::AnalyzeResponse;
use crate::persist::PersistError;

/// Events emitted by the engine while requests are in flight.
#[derive(Debug)]
pub enum EngineEvent {
    /// Real transfer progress for the multipart upload.
    UploadProgress { sent: u64, total: u64 },
    AnalyzeCompleted {
        result: Result<AnalyzeResponse, ApiError>,
    },
    DownloadCompleted {
        kind: DownloadKind,
        result: Result<SavedDownload, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Pdf,
    Xlsx,
    Template,
}

/// A download that reached the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Non-2xx response without a structured error body.
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    /// Human-readable message parsed from a structured error body.
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

//! Triage engine: HTTP client for the analysis service and effect execution.
mod api;
mod client;
mod engine;
mod filename;
mod persist;
mod types;

pub use api::{AnalyzeResponse, AnalyzeSuccess, PdfRequest, Resumo, TemposParciais, XlsxRequest};
pub use client::{ApiClient, ChannelProgressSink, ClientSettings, ProgressSink, ReqwestApiClient};
pub use engine::{EngineConfig, EngineHandle, TimestampFn};
pub use filename::{pdf_filename, template_filename, xlsx_filename};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{ApiError, DownloadKind, EngineEvent, SavedDownload};

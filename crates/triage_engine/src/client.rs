use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::api::{classify_analyze_body, AnalyzeResponse, ErrorBody, PdfRequest, XlsxRequest};
use crate::{ApiError, EngineEvent};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Covers the whole exchange; analyses of large queues take a while.
    pub request_timeout: Duration,
    pub upload_chunk_bytes: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            upload_chunk_bytes: 64 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Uploads the staged file and parses the structured response. Transfer
    /// progress is reported per chunk through `sink`.
    async fn analyze(
        &self,
        path: &Path,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<AnalyzeResponse, ApiError>;

    async fn download_pdf(&self, request: &PdfRequest) -> Result<Bytes, ApiError>;

    async fn download_xlsx(&self, request: &XlsxRequest) -> Result<Bytes, ApiError>;

    async fn download_template(&self) -> Result<Bytes, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ApiError::Network(format!("invalid base url: {err}")))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Network(format!("invalid endpoint {path}: {err}")))
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn analyze(
        &self,
        path: &Path,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<AnalyzeResponse, ApiError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|source| {
            ApiError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let total = metadata.len();
        let file = tokio::fs::File::open(path).await.map_err(|source| {
            ApiError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        sink.emit(EngineEvent::UploadProgress { sent: 0, total });

        let sent = Arc::new(AtomicU64::new(0));
        let progress_sink = sink.clone();
        let stream = ReaderStream::with_capacity(file, self.settings.upload_chunk_bytes).inspect(
            move |chunk| {
                if let Ok(chunk) = chunk {
                    let so_far =
                        sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
                    progress_sink.emit(EngineEvent::UploadProgress {
                        sent: so_far.min(total),
                        total,
                    });
                }
            },
        );

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/analyze_file")?)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // The body is fully flushed once the response arrives; cover the case
        // where no chunk event fired (zero-length files included).
        sink.emit(EngineEvent::UploadProgress { sent: total, total });

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        // The service ships its structured error payloads with 4xx/5xx
        // statuses; a parseable body wins over the status line.
        match classify_analyze_body(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::HttpStatus(status.as_u16())),
            Err(reason) => Err(ApiError::InvalidBody(reason)),
        }
    }

    async fn download_pdf(&self, request: &PdfRequest) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/download_pdf")?)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        collect_binary(response).await
    }

    async fn download_xlsx(&self, request: &XlsxRequest) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/download_xlsx")?)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        collect_binary(response).await
    }

    async fn download_template(&self) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/download-modelo")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        collect_binary(response).await
    }
}

/// Collects a binary response, surfacing a structured `{error}` body as a
/// server-reported message before falling back to the bare status.
async fn collect_binary(response: reqwest::Response) -> Result<Bytes, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("json"))
        .unwrap_or(false);
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    if is_json || !status.is_success() {
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(&bytes) {
            return Err(ApiError::Server(body.error));
        }
    }
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    Ok(bytes)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use triage_logging::{triage_debug, triage_warn};

use crate::api::{PdfRequest, XlsxRequest};
use crate::client::{ApiClient, ChannelProgressSink, ClientSettings, ReqwestApiClient};
use crate::filename::{pdf_filename, template_filename, xlsx_filename};
use crate::persist::AtomicFileWriter;
use crate::{ApiError, DownloadKind, EngineEvent, SavedDownload};

enum EngineCommand {
    Analyze { path: PathBuf, file_name: String },
    DownloadPdf(PdfRequest),
    DownloadXlsx(XlsxRequest),
    DownloadTemplate,
}

/// Clock injected by the frontend so engine code stays wall-clock free.
pub type TimestampFn = Arc<dyn Fn() -> String + Send + Sync>;

pub struct EngineConfig {
    pub client: ClientSettings,
    pub output_dir: PathBuf,
    /// Stamps XLSX filenames; frontends usually inject a readable clock.
    pub timestamp: TimestampFn,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            client: ClientSettings::default(),
            output_dir,
            timestamp: Arc::new(default_timestamp),
        }
    }
}

fn default_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    secs.to_string()
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        // Fails fast on a bad base URL, before the worker thread exists.
        let client = Arc::new(ReqwestApiClient::new(config.client)?);
        let output_dir = config.output_dir;
        let timestamp = config.timestamp;

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let output_dir = output_dir.clone();
                let timestamp = timestamp.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, &output_dir, &timestamp, event_tx)
                        .await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn analyze(&self, path: impl Into<PathBuf>, file_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Analyze {
            path: path.into(),
            file_name: file_name.into(),
        });
    }

    pub fn download_pdf(&self, request: PdfRequest) {
        let _ = self.cmd_tx.send(EngineCommand::DownloadPdf(request));
    }

    pub fn download_xlsx(&self, request: XlsxRequest) {
        let _ = self.cmd_tx.send(EngineCommand::DownloadXlsx(request));
    }

    pub fn download_template(&self) {
        let _ = self.cmd_tx.send(EngineCommand::DownloadTemplate);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    client: &dyn ApiClient,
    command: EngineCommand,
    output_dir: &Path,
    timestamp: &TimestampFn,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Analyze { path, file_name } => {
            triage_debug!("analyze upload start file={}", file_name);
            let sink = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let result = client.analyze(&path, &file_name, sink).await;
            if let Err(err) = &result {
                triage_warn!("analyze request failed: {}", err);
            }
            let _ = event_tx.send(EngineEvent::AnalyzeCompleted { result });
        }
        EngineCommand::DownloadPdf(request) => {
            let result = client
                .download_pdf(&request)
                .await
                .and_then(|bytes| save_download(output_dir, pdf_filename().to_string(), &bytes));
            let _ = event_tx.send(EngineEvent::DownloadCompleted {
                kind: DownloadKind::Pdf,
                result,
            });
        }
        EngineCommand::DownloadXlsx(request) => {
            let file_name = xlsx_filename(&timestamp.as_ref()());
            let result = client
                .download_xlsx(&request)
                .await
                .and_then(|bytes| save_download(output_dir, file_name, &bytes));
            let _ = event_tx.send(EngineEvent::DownloadCompleted {
                kind: DownloadKind::Xlsx,
                result,
            });
        }
        EngineCommand::DownloadTemplate => {
            let result = client
                .download_template()
                .await
                .and_then(|bytes| save_download(output_dir, template_filename().to_string(), &bytes));
            let _ = event_tx.send(EngineEvent::DownloadCompleted {
                kind: DownloadKind::Template,
                result,
            });
        }
    }
}

fn save_download(
    output_dir: &Path,
    file_name: String,
    bytes: &[u8],
) -> Result<SavedDownload, ApiError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let path = writer.write(&file_name, bytes)?;
    triage_debug!("saved download {:?}", path);
    Ok(SavedDownload { file_name, path })
}

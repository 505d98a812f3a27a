use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// Lifecycle phase of the upload/analyze/download controller. Every control
/// affordance in the view model derives from this plus captured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    FileSelected,
    Uploading,
    Processing,
    ResultsReady,
    Error,
    DownloadInFlight,
}

/// Client-held reference to the user-chosen file. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    /// Lowercased final extension, already validated against the allow-set.
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_patients: u64,
    pub pending_requests: u64,
    pub grouped_patients: u64,
    pub bundles_found: u64,
    pub processing_seconds: f64,
    pub partials: PartialTimes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialTimes {
    pub read: f64,
    pub format: f64,
    pub analyze: f64,
}

/// Server result captured after a successful analysis. The export tables are
/// opaque JSON arrays that round-trip to the service unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub report: Vec<String>,
    pub grouped: Value,
    pub ungrouped: Value,
    pub summary: Summary,
}

/// How an analyze request settled, as seen by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeResult {
    Success(AnalysisOutcome),
    /// Structured `error` payload from the service.
    ServerError(String),
    /// Structured `message` (+ optional `details`) payload, e.g. a file with
    /// missing required columns.
    Rejected {
        message: String,
        details: Option<Value>,
    },
    /// Network-level failure; the reason is already human-readable.
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub(crate) fn info(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, text)
    }

    pub(crate) fn success(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, text)
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }
}

/// Transient drop-area affordance; reverted by a timer, not by semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropFlash {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Pdf,
    Xlsx,
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    ModelInfo,
    Help,
}

/// Client-side error taxonomy. Server and transport errors arrive as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    InvalidFormat { extension: String },
    NoFileSelected,
    NoReportAvailable,
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::InvalidFormat { extension } => {
                write!(f, "Invalid file format \".{extension}\": use .csv or .xlsx.")
            }
            UiError::NoFileSelected => write!(f, "No file selected for analysis."),
            UiError::NoReportAvailable => write!(f, "No report available for download."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    staged: Option<StagedFile>,
    outcome: Option<AnalysisOutcome>,
    status: Option<StatusLine>,
    report_text: Option<String>,
    results_visible: bool,
    /// Displayed percent, 0..=100, monotone within one analyze run.
    progress: Option<u8>,
    drop_flash: Option<DropFlash>,
    download_in_flight: Option<DownloadKind>,
    dark_mode: bool,
    open_modal: Option<ModalKind>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn report_text(&self) -> Option<&str> {
        self.report_text.as_deref()
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn progress_percent(&self) -> Option<u8> {
        self.progress
    }

    pub fn drop_flash(&self) -> Option<DropFlash> {
        self.drop_flash
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn open_modal_kind(&self) -> Option<ModalKind> {
        self.open_modal
    }

    pub fn download_in_flight(&self) -> Option<DownloadKind> {
        self.download_in_flight
    }

    /// Returns the dirty flag and clears it. The frontend re-renders only
    /// when this reports a change.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn request_in_flight(&self) -> bool {
        matches!(
            self.phase,
            Phase::Uploading | Phase::Processing | Phase::DownloadInFlight
        )
    }

    pub(crate) fn set_dark_mode(&mut self, dark_mode: bool) {
        if self.dark_mode != dark_mode {
            self.dark_mode = dark_mode;
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.mark_dirty();
        self.dark_mode
    }

    /// Drops the staged file AND any captured results. Runs before validation
    /// of a new offer so a rejected file cannot leave stale downloads behind.
    pub(crate) fn clear_selection(&mut self) {
        self.staged = None;
        self.outcome = None;
        self.status = None;
        self.report_text = None;
        self.results_visible = false;
        self.progress = None;
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    pub(crate) fn stage_file(&mut self, file: StagedFile) {
        self.staged = Some(file);
        self.phase = Phase::FileSelected;
        self.drop_flash = Some(DropFlash::Accepted);
        self.mark_dirty();
    }

    pub(crate) fn reject_file(&mut self, extension: String) {
        self.staged = None;
        self.phase = Phase::Idle;
        self.drop_flash = Some(DropFlash::Rejected);
        self.status = Some(StatusLine::error(
            UiError::InvalidFormat { extension }.to_string(),
        ));
        self.mark_dirty();
    }

    pub(crate) fn clear_drop_flash(&mut self) {
        if self.drop_flash.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn staged_path_and_name(&self) -> Option<(PathBuf, String)> {
        self.staged
            .as_ref()
            .map(|file| (file.path.clone(), file.name.clone()))
    }

    pub(crate) fn set_error_status(&mut self, text: String) {
        self.status = Some(StatusLine::error(text));
        self.mark_dirty();
    }

    pub(crate) fn begin_analysis(&mut self) {
        self.phase = Phase::Uploading;
        self.progress = Some(0);
        // Replaced before any downstream read can observe the old result.
        self.outcome = None;
        self.results_visible = false;
        self.report_text = None;
        self.status = Some(StatusLine::info("Uploading file for analysis..."));
        self.mark_dirty();
    }

    /// Scales real transfer progress into the lower half of the bar.
    /// Returns true exactly when the upload completes and the cosmetic
    /// processing phase should start.
    pub(crate) fn apply_upload_progress(&mut self, sent: u64, total: u64) -> bool {
        if self.phase != Phase::Uploading {
            return false;
        }
        let scaled = if total == 0 {
            50
        } else {
            (sent.min(total).saturating_mul(50) / total) as u8
        };
        let current = self.progress.unwrap_or(0);
        let next = current.max(scaled);
        if next != current {
            self.progress = Some(next);
            self.mark_dirty();
        }
        if sent >= total {
            self.phase = Phase::Processing;
            self.progress = Some(next.max(50));
            self.mark_dirty();
            return true;
        }
        false
    }

    pub(crate) fn apply_processing_tick(&mut self, increment: u8) {
        if self.phase != Phase::Processing {
            return;
        }
        let current = self.progress.unwrap_or(50).max(50);
        let next = current.saturating_add(increment).min(100);
        if self.progress != Some(next) {
            self.progress = Some(next);
            self.mark_dirty();
        }
    }

    pub(crate) fn settle_analysis(&mut self, result: AnalyzeResult) {
        self.progress = None;
        match result {
            AnalyzeResult::Success(outcome) => {
                self.status = Some(StatusLine::success("Analysis completed successfully."));
                self.report_text = Some(outcome.report.join("\n"));
                self.outcome = Some(outcome);
                self.results_visible = true;
                self.phase = Phase::ResultsReady;
            }
            AnalyzeResult::ServerError(text) => {
                self.report_text = Some(format!("Analysis error: {text}"));
                self.status = Some(StatusLine::error(text));
                self.results_visible = true;
                self.phase = Phase::Error;
            }
            AnalyzeResult::Rejected { message, details } => {
                let details = details
                    .map(|value| {
                        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
                    })
                    .unwrap_or_else(|| "{}".to_string());
                self.report_text = Some(format!("Details: {details}"));
                self.status = Some(StatusLine::error(message));
                self.results_visible = true;
                self.phase = Phase::Error;
            }
            AnalyzeResult::Transport(reason) => {
                self.status = Some(StatusLine::error(format!("Failed to send file: {reason}")));
                self.report_text = Some("Could not reach the analysis service.".to_string());
                self.results_visible = true;
                self.phase = Phase::Error;
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn pdf_payload(&self) -> Option<(Vec<String>, f64)> {
        self.outcome
            .as_ref()
            .map(|outcome| (outcome.report.clone(), outcome.summary.processing_seconds))
    }

    pub(crate) fn xlsx_payload(&self) -> Option<(Value, Value)> {
        self.outcome
            .as_ref()
            .map(|outcome| (outcome.grouped.clone(), outcome.ungrouped.clone()))
    }

    pub(crate) fn begin_download(&mut self, kind: DownloadKind) {
        self.download_in_flight = Some(kind);
        self.phase = Phase::DownloadInFlight;
        self.mark_dirty();
    }

    pub(crate) fn settle_download(&mut self, kind: DownloadKind, result: Result<PathBuf, String>) {
        self.download_in_flight = None;
        self.phase = if self.outcome.is_some() {
            Phase::ResultsReady
        } else if self.staged.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        };
        match result {
            Ok(path) => {
                self.status = Some(StatusLine::success(format!("Saved {}", path.display())));
            }
            Err(reason) => {
                let label = match kind {
                    DownloadKind::Pdf => "PDF",
                    DownloadKind::Xlsx => "XLSX",
                    DownloadKind::Template => "template",
                };
                self.status = Some(StatusLine::error(format!(
                    "Failed to download {label}: {reason}"
                )));
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn set_open_modal(&mut self, kind: ModalKind) {
        if self.open_modal != Some(kind) {
            self.open_modal = Some(kind);
            self.mark_dirty();
        }
    }

    pub(crate) fn close_modal(&mut self) {
        if self.open_modal.take().is_some() {
            self.mark_dirty();
        }
    }
}

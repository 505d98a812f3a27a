//! Triage core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{
    Effect, DROP_FLASH_RESET_MS, PROCESSING_TICK_MAX_INCREMENT, PROCESSING_TICK_MS,
};
pub use msg::Msg;
pub use state::{
    AnalysisOutcome, AnalyzeResult, AppState, DownloadKind, DropFlash, ModalKind, PartialTimes,
    Phase, StagedFile, StatusKind, StatusLine, Summary, UiError,
};
pub use update::update;
pub use view_model::{ProgressView, ViewModel};

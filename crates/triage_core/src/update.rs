use crate::{AppState, DownloadKind, Effect, Msg, StagedFile, UiError};

const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PrefsLoaded { dark_mode } => {
            state.set_dark_mode(dark_mode);
            Vec::new()
        }
        Msg::FileOffered { name, path } => {
            if state.request_in_flight() {
                return (state, Vec::new());
            }
            // Previous selection and captured results go first, so a rejected
            // offer cannot leave a stale report behind.
            state.clear_selection();
            let extension = extension_of(&name);
            if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
                state.stage_file(StagedFile {
                    name,
                    path,
                    extension,
                });
            } else {
                state.reject_file(extension);
            }
            vec![Effect::ScheduleDropFlashReset]
        }
        Msg::SelectionCleared => {
            if state.request_in_flight() {
                return (state, Vec::new());
            }
            state.clear_selection();
            Vec::new()
        }
        Msg::DropFlashExpired => {
            // Timed UI reset only; no semantic state change.
            state.clear_drop_flash();
            Vec::new()
        }
        Msg::AnalyzeClicked => {
            if state.request_in_flight() {
                return (state, Vec::new());
            }
            match state.staged_path_and_name() {
                None => {
                    state.set_error_status(UiError::NoFileSelected.to_string());
                    Vec::new()
                }
                Some((path, file_name)) => {
                    state.begin_analysis();
                    vec![Effect::StartAnalyze { path, file_name }]
                }
            }
        }
        Msg::UploadProgress { sent, total } => {
            if state.apply_upload_progress(sent, total) {
                vec![Effect::StartProcessingTicker]
            } else {
                Vec::new()
            }
        }
        Msg::ProcessingTick { increment } => {
            state.apply_processing_tick(increment);
            Vec::new()
        }
        Msg::AnalyzeFinished(result) => {
            state.settle_analysis(result);
            // The ticker may still be running when the response lands early.
            vec![Effect::StopProcessingTicker]
        }
        Msg::DownloadPdfClicked => {
            if state.request_in_flight() {
                Vec::new()
            } else if let Some((report, processing_seconds)) = state.pdf_payload() {
                state.begin_download(DownloadKind::Pdf);
                vec![Effect::DownloadPdf {
                    report,
                    processing_seconds,
                }]
            } else {
                state.set_error_status(UiError::NoReportAvailable.to_string());
                Vec::new()
            }
        }
        Msg::DownloadXlsxClicked => {
            if state.request_in_flight() {
                Vec::new()
            } else if let Some((grouped, ungrouped)) = state.xlsx_payload() {
                state.begin_download(DownloadKind::Xlsx);
                vec![Effect::DownloadXlsx { grouped, ungrouped }]
            } else {
                state.set_error_status(UiError::NoReportAvailable.to_string());
                Vec::new()
            }
        }
        Msg::DownloadTemplateClicked => {
            if state.request_in_flight() {
                Vec::new()
            } else {
                state.begin_download(DownloadKind::Template);
                vec![Effect::DownloadTemplate]
            }
        }
        Msg::DownloadFinished { kind, result } => {
            state.settle_download(kind, result);
            Vec::new()
        }
        Msg::ThemeToggled => {
            let dark_mode = state.toggle_dark_mode();
            vec![Effect::PersistTheme { dark_mode }]
        }
        Msg::ModalOpened(kind) => {
            state.set_open_modal(kind);
            Vec::new()
        }
        Msg::ModalClosed => {
            state.close_modal();
            Vec::new()
        }
    };

    (state, effects)
}

/// Final `.`-separated segment, lowercased. A name without a dot yields the
/// whole name, which then fails the allow-set check.
fn extension_of(name: &str) -> String {
    name.rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

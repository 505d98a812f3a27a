use crate::state::{AnalysisOutcome, AppState, DropFlash, ModalKind, Phase, StatusLine};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub phase: Phase,
    pub dark_mode: bool,
    pub selected_file: Option<String>,
    pub status: Option<StatusLine>,
    pub drop_flash: Option<DropFlash>,
    pub analyze_enabled: bool,
    pub pdf_enabled: bool,
    pub xlsx_enabled: bool,
    pub progress: Option<ProgressView>,
    pub summary_lines: Vec<String>,
    pub timing_lines: Vec<String>,
    pub report_text: Option<String>,
    pub results_visible: bool,
    pub download_notice: bool,
    pub open_modal: Option<ModalKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub label: String,
}

impl AppState {
    /// Projects the state into everything the frontend renders. All control
    /// affordances derive from the phase plus captured data; frontends never
    /// toggle them ad hoc.
    pub fn view(&self) -> ViewModel {
        let settled = matches!(
            self.phase(),
            Phase::FileSelected | Phase::ResultsReady | Phase::Error
        );
        ViewModel {
            phase: self.phase(),
            dark_mode: self.dark_mode(),
            selected_file: self.staged().map(|file| file.name.clone()),
            status: self.status().cloned(),
            drop_flash: self.drop_flash(),
            analyze_enabled: self.staged().is_some() && settled,
            pdf_enabled: self.outcome().is_some() && self.phase() == Phase::ResultsReady,
            xlsx_enabled: self.outcome().is_some() && self.phase() == Phase::ResultsReady,
            progress: self.progress_percent().map(|percent| ProgressView {
                percent,
                label: format!("Processing... {percent}%"),
            }),
            summary_lines: self.outcome().map(summary_lines).unwrap_or_default(),
            timing_lines: self.outcome().map(timing_lines).unwrap_or_default(),
            report_text: self.report_text().map(ToOwned::to_owned),
            results_visible: self.results_visible(),
            download_notice: self.download_in_flight().is_some(),
            open_modal: self.open_modal_kind(),
        }
    }
}

fn summary_lines(outcome: &AnalysisOutcome) -> Vec<String> {
    let summary = &outcome.summary;
    vec![
        format!("Total patients: {}", summary.total_patients),
        format!("Pending requests: {}", summary.pending_requests),
        format!("Patients in bundles: {}", summary.grouped_patients),
        format!("Bundles found: {}", summary.bundles_found),
        format!("Total processing time: {} s", summary.processing_seconds),
    ]
}

fn timing_lines(outcome: &AnalysisOutcome) -> Vec<String> {
    let partials = &outcome.summary.partials;
    vec![
        format!("File read: {} s", partials.read),
        format!("Data formatting: {} s", partials.format),
        format!("Data analysis: {} s", partials.analyze),
    ]
}

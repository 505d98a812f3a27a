use std::path::PathBuf;
use std::sync::Once;

use serde_json::json;
use triage_core::{
    update, AnalysisOutcome, AnalyzeResult, AppState, DownloadKind, Effect, ModalKind, Msg,
    PartialTimes, Phase, StatusKind, Summary,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(triage_logging::initialize_for_tests);
}

fn results_ready_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::FileOffered {
            name: "fila.xlsx".to_string(),
            path: PathBuf::from("fila.xlsx"),
        },
    );
    let (state, _) = update(state, Msg::AnalyzeClicked);
    let (state, _) = update(
        state,
        Msg::AnalyzeFinished(AnalyzeResult::Success(AnalysisOutcome {
            report: vec!["line one".to_string(), "line two".to_string()],
            grouped: json!([{"AGRUPAMENTO_OCI": "09.01.01.001-4"}]),
            ungrouped: json!([{"CODIGO_SIGTAP": "0204030030"}]),
            summary: Summary {
                total_patients: 7,
                pending_requests: 9,
                grouped_patients: 4,
                bundles_found: 2,
                processing_seconds: 0.8,
                partials: PartialTimes {
                    read: 0.1,
                    format: 0.2,
                    analyze: 0.5,
                },
            },
        })),
    );
    state
}

#[test]
fn downloads_before_any_analysis_issue_no_request() {
    init_logging();
    for msg in [Msg::DownloadPdfClicked, Msg::DownloadXlsxClicked] {
        let (state, effects) = update(AppState::new(), msg);
        let view = state.view();

        assert!(effects.is_empty());
        assert_eq!(view.phase, Phase::Idle);
        let status = view.status.expect("status set");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "No report available for download.");
    }
}

#[test]
fn pdf_download_carries_report_and_processing_time() {
    init_logging();
    let state = results_ready_state();

    let (state, effects) = update(state, Msg::DownloadPdfClicked);
    let view = state.view();

    assert_eq!(view.phase, Phase::DownloadInFlight);
    assert!(view.download_notice);
    assert!(!view.pdf_enabled && !view.xlsx_enabled);
    assert_eq!(
        effects,
        vec![Effect::DownloadPdf {
            report: vec!["line one".to_string(), "line two".to_string()],
            processing_seconds: 0.8,
        }]
    );
}

#[test]
fn xlsx_download_carries_both_export_tables() {
    init_logging();
    let state = results_ready_state();

    let (_state, effects) = update(state, Msg::DownloadXlsxClicked);

    assert_eq!(
        effects,
        vec![Effect::DownloadXlsx {
            grouped: json!([{"AGRUPAMENTO_OCI": "09.01.01.001-4"}]),
            ungrouped: json!([{"CODIGO_SIGTAP": "0204030030"}]),
        }]
    );
}

#[test]
fn only_one_download_runs_at_a_time() {
    init_logging();
    let state = results_ready_state();
    let (state, _) = update(state, Msg::DownloadPdfClicked);

    let (state, effects) = update(state, Msg::DownloadXlsxClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().phase, Phase::DownloadInFlight);
}

#[test]
fn download_notice_is_dismissed_on_both_settlement_paths() {
    init_logging();

    let state = results_ready_state();
    let (state, _) = update(state, Msg::DownloadPdfClicked);
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            kind: DownloadKind::Pdf,
            result: Ok(PathBuf::from("downloads/relatorio_agrupamentos_oci.pdf")),
        },
    );
    let view = state.view();
    assert!(!view.download_notice);
    assert_eq!(view.phase, Phase::ResultsReady);
    assert_eq!(view.status.as_ref().unwrap().kind, StatusKind::Success);
    assert!(view
        .status
        .as_ref()
        .unwrap()
        .text
        .contains("relatorio_agrupamentos_oci.pdf"));

    let state = results_ready_state();
    let (state, _) = update(state, Msg::DownloadXlsxClicked);
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            kind: DownloadKind::Xlsx,
            result: Err("Nenhum relatório fornecido".to_string()),
        },
    );
    let view = state.view();
    assert!(!view.download_notice);
    assert_eq!(view.phase, Phase::ResultsReady);
    let status = view.status.expect("status set");
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("XLSX"));
    assert!(status.text.contains("Nenhum relatório fornecido"));
    // Results stay on screen so the export can be retried.
    assert!(view.xlsx_enabled);
}

#[test]
fn template_download_needs_no_prior_report() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::DownloadTemplateClicked);

    assert_eq!(effects, vec![Effect::DownloadTemplate]);
    assert_eq!(state.view().phase, Phase::DownloadInFlight);

    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            kind: DownloadKind::Template,
            result: Ok(PathBuf::from("downloads/arquivo_modelo.xlsx")),
        },
    );
    assert_eq!(state.view().phase, Phase::Idle);
    assert_eq!(state.view().status.unwrap().kind, StatusKind::Success);
}

#[test]
fn theme_toggle_emits_persist_effect() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ThemeToggled);
    assert!(state.view().dark_mode);
    assert_eq!(effects, vec![Effect::PersistTheme { dark_mode: true }]);

    let (state, effects) = update(state, Msg::ThemeToggled);
    assert!(!state.view().dark_mode);
    assert_eq!(effects, vec![Effect::PersistTheme { dark_mode: false }]);
}

#[test]
fn prefs_restore_does_not_repersist() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PrefsLoaded { dark_mode: true });
    assert!(state.view().dark_mode);
    assert!(effects.is_empty());
}

#[test]
fn modal_opens_and_closes() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ModalOpened(ModalKind::ModelInfo));
    assert_eq!(state.view().open_modal, Some(ModalKind::ModelInfo));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::ModalClosed);
    assert_eq!(state.view().open_modal, None);
    assert!(effects.is_empty());
}

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rand::Rng;
use triage_core::{
    AnalysisOutcome, AnalyzeResult, DownloadKind, Effect, Msg, PartialTimes, Summary,
    DROP_FLASH_RESET_MS, PROCESSING_TICK_MAX_INCREMENT, PROCESSING_TICK_MS,
};
use triage_engine::{
    AnalyzeResponse, ApiError, EngineConfig, EngineEvent, EngineHandle, PdfRequest, Resumo,
    XlsxRequest,
};
use triage_logging::{triage_info, triage_warn};

use crate::input::Input;
use crate::persistence::{self, UiPrefs};

/// Executes effects against the engine and timer threads, and maps engine
/// events back into core messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    prefs_dir: PathBuf,
    input_tx: mpsc::Sender<Input>,
    /// Bumped on every start/stop so a stale ticker thread from a previous
    /// run can never feed the current one.
    ticker_generation: Arc<AtomicU64>,
}

impl EffectRunner {
    pub(crate) fn new(
        config: EngineConfig,
        prefs_dir: PathBuf,
        input_tx: mpsc::Sender<Input>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            engine: EngineHandle::new(config)?,
            prefs_dir,
            input_tx,
            ticker_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartAnalyze { path, file_name } => {
                    triage_info!("analyze start file={}", file_name);
                    self.engine.analyze(path, file_name);
                }
                Effect::DownloadPdf {
                    report,
                    processing_seconds,
                } => {
                    self.engine.download_pdf(PdfRequest {
                        relatorio: report,
                        tempo_processamento: processing_seconds,
                    });
                }
                Effect::DownloadXlsx { grouped, ungrouped } => {
                    self.engine.download_xlsx(XlsxRequest {
                        relatorio_agrupamentos: grouped,
                        relatorio_nao_agrupados: ungrouped,
                    });
                }
                Effect::DownloadTemplate => self.engine.download_template(),
                Effect::ScheduleDropFlashReset => self.schedule_drop_flash_reset(),
                Effect::StartProcessingTicker => self.start_processing_ticker(),
                Effect::StopProcessingTicker => {
                    self.ticker_generation.fetch_add(1, Ordering::SeqCst);
                }
                Effect::PersistTheme { dark_mode } => {
                    persistence::save_prefs(&self.prefs_dir, UiPrefs { dark_mode });
                }
            }
        }
    }

    pub(crate) fn poll_event(&self) -> Option<Msg> {
        self.engine.try_recv().map(event_to_msg)
    }

    fn schedule_drop_flash_reset(&self) {
        let tx = self.input_tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(DROP_FLASH_RESET_MS));
            let _ = tx.send(Input::Msg(Msg::DropFlashExpired));
        });
    }

    fn start_processing_ticker(&self) {
        let generation = self.ticker_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.ticker_generation.clone();
        let tx = self.input_tx.clone();
        thread::spawn(move || {
            let mut rng = rand::thread_rng();
            loop {
                thread::sleep(Duration::from_millis(PROCESSING_TICK_MS));
                if live.load(Ordering::SeqCst) != generation {
                    break;
                }
                // Cosmetic only; the server reports no processing progress.
                let increment = rng.gen_range(0..=PROCESSING_TICK_MAX_INCREMENT);
                if tx.send(Input::Msg(Msg::ProcessingTick { increment })).is_err() {
                    break;
                }
            }
        });
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadProgress { sent, total } => Msg::UploadProgress { sent, total },
        EngineEvent::AnalyzeCompleted { result } => Msg::AnalyzeFinished(map_analyze_result(result)),
        EngineEvent::DownloadCompleted { kind, result } => Msg::DownloadFinished {
            kind: map_download_kind(kind),
            result: result
                .map(|saved| saved.path)
                .map_err(|err| err.to_string()),
        },
    }
}

fn map_analyze_result(result: Result<AnalyzeResponse, ApiError>) -> AnalyzeResult {
    match result {
        Ok(AnalyzeResponse::Success(success)) => AnalyzeResult::Success(AnalysisOutcome {
            report: success.relatorio,
            grouped: success.relatorio_agrupamentos,
            ungrouped: success.relatorio_nao_agrupados,
            summary: map_summary(success.resumo),
        }),
        Ok(AnalyzeResponse::Failure { error }) => AnalyzeResult::ServerError(error),
        Ok(AnalyzeResponse::Rejection { message, details }) => {
            AnalyzeResult::Rejected { message, details }
        }
        Err(err) => {
            triage_warn!("analyze request failed: {}", err);
            AnalyzeResult::Transport(err.to_string())
        }
    }
}

fn map_summary(resumo: Resumo) -> Summary {
    Summary {
        total_patients: resumo.total_pacientes,
        pending_requests: resumo.total_solicitacoes,
        grouped_patients: resumo.pacientes_agrupados,
        bundles_found: resumo.agrupamentos_encontrados,
        processing_seconds: resumo.tempo_processamento,
        partials: PartialTimes {
            read: resumo.tempos_parciais.leitura,
            format: resumo.tempos_parciais.formatacao,
            analyze: resumo.tempos_parciais.analise,
        },
    }
}

fn map_download_kind(kind: triage_engine::DownloadKind) -> DownloadKind {
    match kind {
        triage_engine::DownloadKind::Pdf => DownloadKind::Pdf,
        triage_engine::DownloadKind::Xlsx => DownloadKind::Xlsx,
        triage_engine::DownloadKind::Template => DownloadKind::Template,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use triage_core::{AnalyzeResult, DownloadKind, Msg};
    use triage_engine::{
        AnalyzeResponse, AnalyzeSuccess, ApiError, EngineEvent, Resumo, SavedDownload,
        TemposParciais,
    };

    use super::{event_to_msg, map_analyze_result};

    fn sample_success() -> AnalyzeSuccess {
        AnalyzeSuccess {
            relatorio: vec!["line".to_string()],
            relatorio_agrupamentos: json!([{"CBO": "225125"}]),
            relatorio_nao_agrupados: json!([]),
            resumo: Resumo {
                total_pacientes: 42,
                total_solicitacoes: 128,
                pacientes_agrupados: 17,
                agrupamentos_encontrados: 3,
                tempo_processamento: 1.25,
                tempos_parciais: TemposParciais {
                    leitura: 0.21,
                    formatacao: 0.34,
                    analise: 0.7,
                },
            },
        }
    }

    #[test]
    fn success_payload_maps_field_by_field() {
        let mapped = map_analyze_result(Ok(AnalyzeResponse::Success(sample_success())));
        match mapped {
            AnalyzeResult::Success(outcome) => {
                assert_eq!(outcome.summary.total_patients, 42);
                assert_eq!(outcome.summary.pending_requests, 128);
                assert_eq!(outcome.summary.partials.read, 0.21);
                assert_eq!(outcome.grouped, json!([{"CBO": "225125"}]));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn transport_errors_become_readable_text() {
        let mapped = map_analyze_result(Err(ApiError::Timeout));
        assert_eq!(
            mapped,
            AnalyzeResult::Transport("request timed out".to_string())
        );
    }

    #[test]
    fn download_completion_maps_to_saved_path() {
        let msg = event_to_msg(EngineEvent::DownloadCompleted {
            kind: triage_engine::DownloadKind::Xlsx,
            result: Ok(SavedDownload {
                file_name: "relatorio_oci_1.xlsx".to_string(),
                path: "downloads/relatorio_oci_1.xlsx".into(),
            }),
        });
        assert_eq!(
            msg,
            Msg::DownloadFinished {
                kind: DownloadKind::Xlsx,
                result: Ok("downloads/relatorio_oci_1.xlsx".into()),
            }
        );
    }
}

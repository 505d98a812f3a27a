use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use triage_engine::{
    ClientSettings, DownloadKind, EngineConfig, EngineEvent, EngineHandle, PdfRequest,
};

async fn wait_for_completion(handle: &EngineHandle) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();
    loop {
        while let Some(event) = handle.try_recv() {
            let done = matches!(
                event,
                EngineEvent::AnalyzeCompleted { .. } | EngineEvent::DownloadCompleted { .. }
            );
            events.push(event);
            if done {
                return events;
            }
        }
        assert!(Instant::now() < deadline, "engine never settled");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn config_for(server: &MockServer, output_dir: std::path::PathBuf) -> EngineConfig {
    EngineConfig {
        client: ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        },
        output_dir,
        timestamp: Arc::new(|| "20260806_120000".to_string()),
    }
}

#[tokio::test]
async fn engine_runs_analyze_and_emits_progress_then_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze_file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "relatorio": ["line"],
            "resumo": {
                "total_pacientes": 1,
                "total_solicitacoes": 1,
                "pacientes_agrupados": 0,
                "agrupamentos_encontrados": 0,
                "tempo_processamento": 0.1,
                "tempos_parciais": {"leitura": 0.0, "formatacao": 0.0, "analise": 0.1}
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut upload = tempfile::NamedTempFile::new().expect("upload file");
    std::io::Write::write_all(&mut upload, b"DOCUMENTO_PACIENTE\n1\n").unwrap();

    let handle = EngineHandle::new(config_for(&server, dir.path().to_path_buf())).expect("engine");
    handle.analyze(upload.path(), "fila.csv");

    let events = wait_for_completion(&handle).await;
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::UploadProgress { .. })));
    match events.last() {
        Some(EngineEvent::AnalyzeCompleted { result: Ok(_) }) => {}
        other => panic!("expected successful completion, got {other:?}"),
    }
}

#[tokio::test]
async fn engine_saves_pdf_download_under_its_fixed_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 report".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let handle = EngineHandle::new(config_for(&server, dir.path().to_path_buf())).expect("engine");
    handle.download_pdf(PdfRequest {
        relatorio: vec!["line".to_string()],
        tempo_processamento: 0.1,
    });

    let events = wait_for_completion(&handle).await;
    match events.last() {
        Some(EngineEvent::DownloadCompleted {
            kind: DownloadKind::Pdf,
            result: Ok(saved),
        }) => {
            assert_eq!(saved.file_name, "relatorio_agrupamentos_oci.pdf");
            assert_eq!(fs::read(&saved.path).unwrap(), b"%PDF-1.4 report");
        }
        other => panic!("expected saved pdf, got {other:?}"),
    }
}

#[tokio::test]
async fn engine_stamps_xlsx_download_with_injected_clock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download_xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"PK\x03\x04 tables".to_vec(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let handle = EngineHandle::new(config_for(&server, dir.path().to_path_buf())).expect("engine");
    handle.download_xlsx(triage_engine::XlsxRequest {
        relatorio_agrupamentos: json!([{"CBO": "225125"}]),
        relatorio_nao_agrupados: json!([]),
    });

    let events = wait_for_completion(&handle).await;
    match events.last() {
        Some(EngineEvent::DownloadCompleted {
            kind: DownloadKind::Xlsx,
            result: Ok(saved),
        }) => {
            assert_eq!(saved.file_name, "relatorio_oci_20260806_120000.xlsx");
            assert!(saved.path.exists());
        }
        other => panic!("expected saved xlsx, got {other:?}"),
    }
}

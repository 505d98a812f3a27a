//! Wire types for the analysis service. Field names are the service's own
//! and must stay bit-exact.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn empty_table() -> Value {
    Value::Array(Vec::new())
}

/// Summary block of a successful analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resumo {
    pub total_pacientes: u64,
    pub total_solicitacoes: u64,
    pub pacientes_agrupados: u64,
    pub agrupamentos_encontrados: u64,
    pub tempo_processamento: f64,
    pub tempos_parciais: TemposParciais,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemposParciais {
    pub leitura: f64,
    pub formatacao: f64,
    pub analise: f64,
}

/// The three payload shapes `/analyze_file` can return, in the order the
/// service distinguishes them: `error`, then `success`, then `message`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeResponse {
    Success(AnalyzeSuccess),
    Failure { error: String },
    Rejection { message: String, details: Option<Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeSuccess {
    pub relatorio: Vec<String>,
    /// Export tables round-trip opaquely into the XLSX request.
    pub relatorio_agrupamentos: Value,
    pub relatorio_nao_agrupados: Value,
    pub resumo: Resumo,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAnalyzeResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
    #[serde(default)]
    relatorio: Option<Vec<String>>,
    #[serde(default = "empty_table")]
    relatorio_agrupamentos: Value,
    #[serde(default = "empty_table")]
    relatorio_nao_agrupados: Value,
    #[serde(default)]
    resumo: Option<Resumo>,
}

pub(crate) fn classify_analyze_body(bytes: &[u8]) -> Result<AnalyzeResponse, String> {
    let raw: RawAnalyzeResponse =
        serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
    if let Some(error) = raw.error {
        return Ok(AnalyzeResponse::Failure { error });
    }
    if raw.success == Some(true) {
        let relatorio = raw
            .relatorio
            .ok_or_else(|| "success payload missing relatorio".to_string())?;
        let resumo = raw
            .resumo
            .ok_or_else(|| "success payload missing resumo".to_string())?;
        return Ok(AnalyzeResponse::Success(AnalyzeSuccess {
            relatorio,
            relatorio_agrupamentos: raw.relatorio_agrupamentos,
            relatorio_nao_agrupados: raw.relatorio_nao_agrupados,
            resumo,
        }));
    }
    if let Some(message) = raw.message {
        return Ok(AnalyzeResponse::Rejection {
            message,
            details: raw.details,
        });
    }
    Err("unrecognized analyze payload".to_string())
}

/// Body for `/download_pdf`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfRequest {
    pub relatorio: Vec<String>,
    pub tempo_processamento: f64,
}

/// Body for `/download_xlsx`: the grouped/non-grouped pair the service
/// implements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XlsxRequest {
    pub relatorio_agrupamentos: Value,
    pub relatorio_nao_agrupados: Value,
}

/// Structured error body the download endpoints return on failure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

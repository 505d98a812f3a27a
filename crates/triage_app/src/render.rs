use triage_core::{DropFlash, ModalKind, Phase, StatusKind, ViewModel};

const BAR_CELLS: usize = 20;

/// Renders the view model as terminal text. Pure so it stays testable.
pub(crate) fn render(view: &ViewModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "[{}] OCI Triage Desk — {}\n",
        if view.dark_mode { "dark" } else { "light" },
        phase_label(view.phase),
    ));

    if let Some(name) = &view.selected_file {
        out.push_str(&format!("Selected file: {name}\n"));
    }
    if let Some(flash) = view.drop_flash {
        out.push_str(match flash {
            DropFlash::Accepted => "Drop area: file accepted\n",
            DropFlash::Rejected => "Drop area: file rejected\n",
        });
    }
    if let Some(status) = &view.status {
        out.push_str(&format!("[{}] {}\n", status_label(status.kind), status.text));
    }
    if let Some(progress) = &view.progress {
        out.push_str(&format!("{} {}\n", progress_bar(progress.percent), progress.label));
    }
    if view.download_notice {
        out.push_str("Preparing file for download. This can take a moment...\n");
    }

    if view.results_visible {
        out.push_str("--- Analysis results ---\n");
        for line in &view.summary_lines {
            out.push_str(line);
            out.push('\n');
        }
        if !view.timing_lines.is_empty() {
            out.push_str("Timing detail:\n");
            for line in &view.timing_lines {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        if let Some(report) = &view.report_text {
            out.push_str(report);
            out.push('\n');
        }
    }

    if let Some(modal) = view.open_modal {
        out.push_str(modal_text(modal));
    }

    out.push_str(&format!(
        "Commands: select <path>{}{}{} | template | theme | model | help | quit\n",
        if view.analyze_enabled { " | analyze" } else { "" },
        if view.pdf_enabled { " | pdf" } else { "" },
        if view.xlsx_enabled { " | xlsx" } else { "" },
    ));
    out
}

fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_CELLS / 100;
    let mut bar = String::with_capacity(BAR_CELLS + 2);
    bar.push('[');
    for cell in 0..BAR_CELLS {
        bar.push(if cell < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Idle",
        Phase::FileSelected => "File selected",
        Phase::Uploading => "Uploading",
        Phase::Processing => "Processing",
        Phase::ResultsReady => "Results ready",
        Phase::Error => "Error",
        Phase::DownloadInFlight => "Downloading",
    }
}

fn status_label(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Info => "info",
        StatusKind::Success => "ok",
        StatusKind::Error => "error",
    }
}

fn modal_text(modal: ModalKind) -> &'static str {
    match modal {
        ModalKind::ModelInfo => MODEL_INFO_TEXT,
        ModalKind::Help => HELP_TEXT,
    }
}

const MODEL_INFO_TEXT: &str = "\
--- Input model ---
The service expects a regulation-queue export (.csv with ';' separator, or
.xlsx) with one row per requested procedure. Required columns:
  IDENTIFICADOR_LOCAL, DOCUMENTO_PACIENTE, DATA_SOLICITACAO, CNES_SOLICITANTE,
  CNES_REGULADOR, CODIGO_SIGTAP, CBO, CID10, CODIGO_MODALIDADE_ASSISTENCIAL,
  CODIGO_CARTER_SOLICITACAO, STATUS, DATA_AUTORIZACAO, DATA_EXECUCAO,
  CNES_EXECUTANTE
Use `template` to fetch a ready-made spreadsheet. Dismiss with `close`.
";

const HELP_TEXT: &str = "\
--- Help ---
  select <path>  stage a .csv or .xlsx queue export
  clear          drop the staged file
  analyze        send the staged file for analysis
  pdf            save the report as PDF (after a successful analysis)
  xlsx           save the export tables as a spreadsheet
  template       download the input template
  theme          toggle dark mode
  model          describe the expected input file
  quit           exit
Dismiss with `close`.
";

use std::path::PathBuf;

use triage_core::{ModalKind, Msg};

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Input {
    Msg(Msg),
    Quit,
    Unknown(String),
    Empty,
}

pub(crate) fn parse(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    match command {
        "select" | "open" => {
            if rest.is_empty() {
                Input::Msg(Msg::SelectionCleared)
            } else {
                let path = PathBuf::from(rest);
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| rest.to_string());
                Input::Msg(Msg::FileOffered { name, path })
            }
        }
        "clear" => Input::Msg(Msg::SelectionCleared),
        "analyze" => Input::Msg(Msg::AnalyzeClicked),
        "pdf" => Input::Msg(Msg::DownloadPdfClicked),
        "xlsx" => Input::Msg(Msg::DownloadXlsxClicked),
        "template" => Input::Msg(Msg::DownloadTemplateClicked),
        "theme" => Input::Msg(Msg::ThemeToggled),
        "model" => Input::Msg(Msg::ModalOpened(ModalKind::ModelInfo)),
        "help" => Input::Msg(Msg::ModalOpened(ModalKind::Help)),
        "close" | "esc" => Input::Msg(Msg::ModalClosed),
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(trimmed.to_string()),
    }
}

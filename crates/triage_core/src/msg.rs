use std::path::PathBuf;

use crate::{AnalyzeResult, DownloadKind, ModalKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Persisted UI preferences restored at startup.
    PrefsLoaded { dark_mode: bool },
    /// A candidate file arrived from drag-drop or the file picker.
    FileOffered { name: String, path: PathBuf },
    /// The picker was dismissed with nothing chosen.
    SelectionCleared,
    /// The transient drop-area flash timer fired.
    DropFlashExpired,
    /// User triggered the analyze action.
    AnalyzeClicked,
    /// Real transfer progress for the in-flight upload.
    UploadProgress { sent: u64, total: u64 },
    /// Cosmetic post-upload ticker increment (0..=5 units per tick).
    ProcessingTick { increment: u8 },
    /// The analyze request settled.
    AnalyzeFinished(AnalyzeResult),
    /// User triggered the PDF export.
    DownloadPdfClicked,
    /// User triggered the XLSX export.
    DownloadXlsxClicked,
    /// User requested the input template file.
    DownloadTemplateClicked,
    /// A download request settled; `Ok` carries the saved path.
    DownloadFinished {
        kind: DownloadKind,
        result: Result<PathBuf, String>,
    },
    /// User toggled dark mode.
    ThemeToggled,
    /// User opened one of the info dialogs.
    ModalOpened(ModalKind),
    /// User dismissed the open dialog.
    ModalClosed,
}

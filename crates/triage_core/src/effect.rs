use std::path::PathBuf;

use serde_json::Value;

/// Delay before the drop-area flash reverts to neutral.
pub const DROP_FLASH_RESET_MS: u64 = 2000;
/// Period of the cosmetic post-upload progress ticker.
pub const PROCESSING_TICK_MS: u64 = 500;
/// Upper bound for a single cosmetic ticker increment.
pub const PROCESSING_TICK_MAX_INCREMENT: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arm the one-shot drop-area reset timer.
    ScheduleDropFlashReset,
    /// Upload the staged file to the analysis service.
    StartAnalyze { path: PathBuf, file_name: String },
    /// Start the cosmetic 50..100 ticker. The increments it produces do not
    /// reflect server-side progress.
    StartProcessingTicker,
    StopProcessingTicker,
    DownloadPdf {
        report: Vec<String>,
        processing_seconds: f64,
    },
    DownloadXlsx { grouped: Value, ungrouped: Value },
    DownloadTemplate,
    PersistTheme { dark_mode: bool },
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use triage_engine::AtomicFileWriter;
use triage_logging::{triage_error, triage_info, triage_warn};

const PREFS_FILENAME: &str = ".triage_prefs.ron";

/// UI preferences restored at startup. Analysis results are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) struct UiPrefs {
    pub dark_mode: bool,
}

pub(crate) fn load_prefs(dir: &Path) -> UiPrefs {
    let path = dir.join(PREFS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return UiPrefs::default();
        }
        Err(err) => {
            triage_warn!("Failed to read prefs from {:?}: {}", path, err);
            return UiPrefs::default();
        }
    };

    match ron::from_str(&content) {
        Ok(prefs) => prefs,
        Err(err) => {
            triage_warn!("Failed to parse prefs from {:?}: {}", path, err);
            UiPrefs::default()
        }
    }
}

pub(crate) fn save_prefs(dir: &Path, prefs: UiPrefs) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&prefs, pretty) {
        Ok(text) => text,
        Err(err) => {
            triage_error!("Failed to serialize prefs: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    match writer.write(PREFS_FILENAME, content.as_bytes()) {
        Ok(path) => triage_info!("Saved UI prefs to {:?}", path),
        Err(err) => triage_error!("Failed to write prefs to {:?}: {}", dir, err),
    }
}

#[cfg(test)]
mod tests {
    use super::{load_prefs, save_prefs, UiPrefs};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_prefs(dir.path()), UiPrefs::default());
    }

    #[test]
    fn prefs_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        save_prefs(dir.path(), UiPrefs { dark_mode: true });
        assert_eq!(load_prefs(dir.path()), UiPrefs { dark_mode: true });
    }

    #[test]
    fn corrupt_prefs_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(".triage_prefs.ron"), "not ron at all").unwrap();
        assert_eq!(load_prefs(dir.path()), UiPrefs::default());
    }
}

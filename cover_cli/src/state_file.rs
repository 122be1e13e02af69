//! JSON file holding the last known state of every cover, keyed by unique id.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cover_core::Cover;
use cover_traits::{RestoreSource, SavedAxis, SavedCover};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub state: String,
    #[serde(default)]
    pub position: Option<u8>,
    #[serde(default)]
    pub tilt_state: String,
    #[serde(default)]
    pub tilt_position: Option<u8>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFile {
    entries: BTreeMap<String, Entry>,
}

impl StateFile {
    /// Read `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file yet");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading state file {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&text)
            .wrap_err_with(|| format!("state file {} is not valid JSON", path.display()))
    }

    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text + "\n")
            .wrap_err_with(|| format!("writing state file {}", path.display()))
    }

    pub fn record(&mut self, cover: &Cover) {
        let saved = cover.saved();
        self.entries.insert(
            cover.unique_id().to_string(),
            Entry {
                state: saved.main.state,
                position: saved.main.position,
                tilt_state: saved.tilt.state,
                tilt_position: saved.tilt.position,
            },
        );
    }
}

impl RestoreSource for StateFile {
    fn last_state(&self, cover_id: &str) -> Option<SavedCover> {
        self.entries.get(cover_id).map(|e| SavedCover {
            main: SavedAxis {
                state: e.state.clone(),
                position: e.position,
            },
            tilt: SavedAxis {
                state: e.tilt_state.clone(),
                position: e.tilt_position,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let s: StateFile =
            serde_json::from_str(r#"{"aa-Hall": {"state": "closed", "position": 0}}"#).unwrap();
        let saved = s.last_state("aa-Hall").unwrap();
        assert_eq!(saved.main.state, "closed");
        assert_eq!(saved.main.position, Some(0));
        assert_eq!(saved.tilt, SavedAxis::default());
        assert!(s.last_state("bb-Hall").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let s = StateFile::load(Path::new("/nonexistent/cover-state.json")).unwrap();
        assert!(s.last_state("anything").is_none());
    }
}

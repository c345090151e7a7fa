//! JSON file state store
//!
//! The whole ledger is one JSON document. Writes go to a sibling temp file
//! that is then renamed over the target, so a crash mid-write leaves the
//! previous document intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::{PairState, StateStore, StoreError};

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    saved_at: DateTime<Utc>,
    pairs: Vec<PairState>,
}

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonStateStore {
    fn load_state(&self) -> Result<Option<Vec<PairState>>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("[StateStore] No state at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let document: StateDocument = serde_json::from_str(&content)?;
        debug!(
            "[StateStore] Loaded {} pairs saved at {}",
            document.pairs.len(),
            document.saved_at
        );
        Ok(Some(document.pairs))
    }

    fn save_state(&self, pairs: &[PairState]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = StateDocument {
            saved_at: Utc::now(),
            pairs: pairs.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!("[StateStore] Saved {} pairs to {}", pairs.len(), self.path.display());
        Ok(())
    }
}

//! Ledger snapshots persisted as JSON.

use crate::{
    errors::{RouletteError, RouletteResult, StorageError},
    games::controller::WagerController,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk wrapper around the controller state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    /// Unix seconds
    pub saved_at: i64,
    pub controller: WagerController,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the controller to `path`, replacing any previous snapshot atomically
pub fn save_snapshot(path: &Path, controller: &WagerController) -> RouletteResult<()> {
    let snapshot = LedgerSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Utc::now().timestamp(),
        controller: controller.clone(),
    };

    let bytes = serde_json::to_vec_pretty(&snapshot).map_err(|e| {
        RouletteError::Storage(StorageError::WriteFailed(format!(
            "Failed to encode snapshot: {}",
            e
        )))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, &bytes)
        .and_then(|_| std::fs::rename(&tmp, path))
        .map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

    tracing::debug!(
        path = %path.display(),
        bets = controller.last_bet_id(),
        "Snapshot saved"
    );
    Ok(())
}

/// Load a snapshot; `Ok(None)` when no file exists yet
pub fn load_snapshot(path: &Path) -> RouletteResult<Option<WagerController>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::ReadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
            .into())
        }
    };

    let snapshot: LedgerSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
        RouletteError::Storage(StorageError::CorruptedData(format!(
            "Failed to decode snapshot {}: {}",
            path.display(),
            e
        )))
    })?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StorageError::CorruptedData(format!(
            "Unsupported snapshot version {}",
            snapshot.version
        ))
        .into());
    }

    snapshot.controller.verify_integrity()?;

    tracing::debug!(
        path = %path.display(),
        bets = snapshot.controller.last_bet_id(),
        "Snapshot loaded"
    );
    Ok(Some(snapshot.controller))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::controller::WagerSettings;
    use crate::games::types::{Address, RawSelector};

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_corrupted_snapshot_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        match load_snapshot(&path) {
            Err(RouletteError::Storage(StorageError::CorruptedData(_))) => {}
            other => panic!("Expected corrupted data error, got {:?}", other.map(|c| c.is_some())),
        }
    }

    #[test]
    fn test_save_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let settings = WagerSettings { bet_amount: 10, ..WagerSettings::default() };
        let mut controller =
            WagerController::new(settings, Address::from_label("owner"), Address::from_label("oracle"));
        save_snapshot(&path, &controller).unwrap();

        controller
            .place_bet(Address::from_label("alice"), &[RawSelector::new(0, 0)], 10)
            .unwrap();
        save_snapshot(&path, &controller).unwrap();

        let loaded = load_snapshot(&path).unwrap().unwrap();
        assert_eq!(loaded.last_bet_id(), 1);
        assert!(!temp_path(&path).exists());
    }
}

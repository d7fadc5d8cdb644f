//! Persistence Store
//!
//! One JSON document under a schema-versioned key. Bumping the key is the
//! migration policy: documents written under an older key are ignored.
//! Whatever comes back from the backend is reconciled before it is handed
//! out, so callers never see a document that violates catalog invariants.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use kids_core::progression::{default_state, reconcile};
use kids_core::{AppState, UnlockPolicy};

pub const STORAGE_KEY: &str = "cambridge-kids-state-v6";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    WriteFailure(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ==================== Backends ====================

/// Key-value storage holding whole documents as strings.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&self, key: &str, contents: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process backend for tests and previews. Writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, contents: &str) -> Self {
        let backend = Self::new();
        backend.entries.lock().insert(key.to_string(), contents.to_string());
        backend
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailure("storage quota exceeded".to_string()));
        }
        self.entries.lock().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ==================== State store ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing stored under the key.
    Fresh,
    Restored,
    /// Stored document was unreadable and replaced by the default.
    Recovered,
}

#[derive(Debug, Clone)]
pub struct LoadedState {
    pub state: AppState,
    pub source: LoadSource,
}

#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
    policy: UnlockPolicy,
}

impl StateStore {
    pub fn new(backend: Arc<dyn StorageBackend>, policy: UnlockPolicy) -> Self {
        Self::with_key(backend, STORAGE_KEY, policy)
    }

    pub fn with_key(backend: Arc<dyn StorageBackend>, key: &str, policy: UnlockPolicy) -> Self {
        Self { backend, key: key.to_string(), policy }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    pub fn load(&self) -> LoadedState {
        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key = %self.key, "no stored progress, starting fresh");
                return LoadedState { state: default_state(self.policy), source: LoadSource::Fresh };
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read stored progress, using defaults");
                return LoadedState { state: default_state(self.policy), source: LoadSource::Recovered };
            }
        };

        match serde_json::from_str::<AppState>(&raw) {
            Ok(loaded) => {
                debug!(key = %self.key, "restored stored progress");
                LoadedState { state: reconcile(&loaded, self.policy), source: LoadSource::Restored }
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored progress is corrupt, using defaults");
                LoadedState { state: default_state(self.policy), source: LoadSource::Recovered }
            }
        }
    }

    pub fn save(&self, state: &AppState) -> StoreResult<()> {
        let contents = serde_json::to_string(state)?;
        self.backend.write(&self.key, &contents).map_err(|err| match err {
            StoreError::WriteFailure(msg) => StoreError::WriteFailure(msg),
            other => StoreError::WriteFailure(other.to_string()),
        })
    }

    pub fn reset(&self) -> StoreResult<()> {
        self.backend.remove(&self.key)
    }
}

// ==================== Save indicator ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing written yet this session.
    Idle,
    Saving,
    Saved { at: DateTime<Utc> },
    Failed { error: String, last_saved_at: Option<DateTime<Utc>> },
}

/// Tracks save completions by sequence number; a completion older than the
/// newest one already recorded does not change the status.
#[derive(Debug, Clone)]
pub struct SaveIndicator {
    next_seq: u64,
    latest_completed: Option<u64>,
    last_saved_at: Option<DateTime<Utc>>,
    status: SaveStatus,
}

impl Default for SaveIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveIndicator {
    pub fn new() -> Self {
        Self { next_seq: 0, latest_completed: None, last_saved_at: None, status: SaveStatus::Idle }
    }

    pub fn begin(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.status = SaveStatus::Saving;
        seq
    }

    /// Returns `false` when the completion was superseded.
    pub fn complete(&mut self, seq: u64, outcome: Result<(), String>, at: DateTime<Utc>) -> bool {
        if self.latest_completed.is_some_and(|latest| seq < latest) {
            return false;
        }
        self.latest_completed = Some(seq);
        self.status = match outcome {
            Ok(()) => {
                self.last_saved_at = Some(at);
                SaveStatus::Saved { at }
            }
            Err(error) => SaveStatus::Failed { error, last_saved_at: self.last_saved_at },
        };
        true
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }
}

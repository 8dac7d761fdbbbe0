//! JSON file tournament store
//!
//! One pretty-printed document per tournament under a base directory. Writes
//! go to a temporary file first and are renamed into place.
//!
//! Every read-compare-write holds a `<id>.lock` file created with
//! `create_new`, so separate processes sharing a directory (two `kartcup`
//! invocations, say) cannot interleave. A store-wide mutex keeps tasks in
//! one process from spinning on each other's lock file.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use shared::{Tournament, TournamentId};

use crate::error::{TournamentError, TournamentResult};
use crate::traits::TournamentStore;

const DOCUMENT_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive hold on one document's lock file, released on drop
#[derive(Debug)]
pub struct DocumentLock {
    path: PathBuf,
}

impl DocumentLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("⚠️ Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

/// File-backed store
pub struct FileTournamentStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
    lock_timeout: Duration,
}

impl FileTournamentStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed
    pub async fn open(base_dir: impl Into<PathBuf>) -> TournamentResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        debug!("📁 Tournament store opened at {}", base_dir.display());

        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// How long to wait for another holder's lock file before giving up
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn document_path(&self, id: &TournamentId) -> PathBuf {
        self.base_dir.join(format!("{id}.{DOCUMENT_EXTENSION}"))
    }

    fn lock_path(&self, id: &TournamentId) -> PathBuf {
        self.base_dir.join(format!("{id}.{LOCK_EXTENSION}"))
    }

    /// Take the cross-process lock for one document.
    ///
    /// A lock file left behind by a crashed process has to be removed by hand;
    /// the timeout error names it.
    pub async fn lock_document(&self, id: &TournamentId) -> TournamentResult<DocumentLock> {
        let path = self.lock_path(id);
        let deadline = Instant::now() + self.lock_timeout;

        loop {
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(_) => return Ok(DocumentLock { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(TournamentError::storage(format!(
                            "tournament {id} is locked by another writer ({})",
                            path.display()
                        )));
                    }
                    sleep(LOCK_POLL_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn read_document(path: &Path) -> TournamentResult<Option<Tournament>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via temp file and rename so readers never see a partial document
    async fn write_document(&self, tournament: &Tournament) -> TournamentResult<()> {
        let path = self.document_path(&tournament.id);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(tournament)?;
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl TournamentStore for FileTournamentStore {
    async fn load(&self, id: &TournamentId) -> TournamentResult<Option<Tournament>> {
        Self::read_document(&self.document_path(id)).await
    }

    async fn insert(&self, tournament: Tournament) -> TournamentResult<Tournament> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.lock_document(&tournament.id).await?;
        if fs::try_exists(self.document_path(&tournament.id)).await? {
            return Err(TournamentError::storage(format!("tournament {} already exists", tournament.id)));
        }
        self.write_document(&tournament).await?;
        Ok(tournament)
    }

    async fn compare_and_swap(&self, expected_revision: u64, mut tournament: Tournament) -> TournamentResult<Tournament> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.lock_document(&tournament.id).await?;
        let stored = Self::read_document(&self.document_path(&tournament.id))
            .await?
            .ok_or(TournamentError::TournamentNotFound { id: tournament.id })?;

        if stored.revision != expected_revision {
            return Err(TournamentError::RevisionConflict {
                id: tournament.id,
                expected: expected_revision,
                actual: stored.revision,
            });
        }

        tournament.revision = expected_revision + 1;
        self.write_document(&tournament).await?;
        Ok(tournament)
    }

    async fn list(&self) -> TournamentResult<Vec<Tournament>> {
        let mut entries = fs::read_dir(&self.base_dir).await?;
        let mut all = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(tournament) = Self::read_document(&path).await? {
                all.push(tournament);
            }
        }

        all.sort_by_key(|t: &Tournament| (t.created_at, t.id));
        Ok(all)
    }

    async fn delete(&self, id: &TournamentId) -> TournamentResult<bool> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.lock_document(id).await?;
        match fs::remove_file(self.document_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

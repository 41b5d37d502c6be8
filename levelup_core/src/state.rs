//! Snapshot persistence with file locking.
//!
//! The persisted snapshot lives at `<data_dir>/<STORAGE_KEY>.json`. Reads
//! take a shared lock; writes go to a locked temp file that is synced and
//! renamed over the original, so a reader never sees a half-written save.

use crate::snapshot::{self, STORAGE_KEY};
use crate::{Error, Result, SaveState};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage collaborator the engine's host persists snapshots through
pub trait SnapshotStore {
    /// Load the stored snapshot; `None` when nothing has been stored yet
    fn load(&self) -> Result<Option<SaveState>>;

    /// Overwrite the stored snapshot
    fn save(&mut self, state: &SaveState) -> Result<()>;
}

/// JSON file store with file locking
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for the fixed storage key inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    /// Corrupt files surface as `Error::InvalidFormat` and are left on disk
    /// untouched.
    fn load(&self) -> Result<Option<SaveState>> {
        if !self.path.exists() {
            tracing::info!("No save found at {:?}, starting fresh", self.path);
            return Ok(None);
        }

        let file = File::open(&self.path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = Vec::new();
        let read = std::io::BufReader::new(&file).read_to_end(&mut contents);
        file.unlock()?;
        read?;

        match snapshot::deserialize(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded save from {:?}", self.path);
                Ok(Some(state))
            }
            Err(e) => {
                tracing::warn!("Save file {:?} is unreadable: {}", self.path, e);
                Err(e)
            }
        }
    }

    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, state: &SaveState) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "save path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let contents = snapshot::serialize(state)?;

        let temp = NamedTempFile::new_in(parent)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(&contents)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved level {} snapshot to {:?}", state.level, self.path);
        Ok(())
    }
}

impl SaveState {
    /// Load from a store, falling back to the default state when empty
    pub fn load_or_default(store: &dyn SnapshotStore) -> Result<Self> {
        Ok(store.load()?.unwrap_or_default())
    }

    /// Load state, modify it, and save it back.
    ///
    /// Nothing is written when the closure fails.
    pub fn update<S, F>(store: &mut S, f: F) -> Result<Self>
    where
        S: SnapshotStore,
        F: FnOnce(&mut SaveState) -> Result<()>,
    {
        let mut state = Self::load_or_default(&*store)?;
        f(&mut state)?;
        store.save(&state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(temp_dir.path());

        let mut state = SaveState::default();
        state.coins = 42;
        state.settings.display_name = "Jin".into();
        crate::leveling::apply_exp(&mut state, 333.3);

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_storage_key_file_name() {
        let store = FileStore::in_dir(Path::new("/data"));
        assert_eq!(
            store.path(),
            Path::new("/data/solo-leveling-irl-offline.json")
        );
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());

        assert!(store.load().unwrap().is_none());
        assert_eq!(
            SaveState::load_or_default(&store).unwrap(),
            SaveState::default()
        );
    }

    #[test]
    fn test_corrupted_save_is_error_and_left_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(Error::InvalidFormat(_))));

        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "{ invalid json }");
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(temp_dir.path());

        SaveState::update(&mut store, |state| {
            state.inventory.push("Iron Dumbbell".into());
            Ok(())
        })
        .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.inventory.len(), 2);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(temp_dir.path());

        let result = SaveState::update(&mut store, |_| Err(Error::Config("boom".into())));

        assert!(result.is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(temp_dir.path());

        store.save(&SaveState::default()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "solo-leveling-irl-offline.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only the save file, found extras: {:?}",
            extras
        );
    }
}

//! JSON-file persistence adapter for the four temple collections.
//!
//! Each collection is one flat file under the data directory:
//!
//! - `scroll_data.json` — array of scroll records
//! - `seekers.json`     — object keyed by seeker id
//! - `visitors.json`    — object keyed by visitor id
//! - `oracle_log.json`  — array of interaction entries
//!
//! Reads never fail: an absent, unreadable or malformed file yields the
//! collection's documented empty default. Writes replace the whole file via
//! a temp file in the same directory followed by a rename, so a crash
//! mid-write cannot leave a file the next load can't parse.
//!
//! Every load-mutate-save sequence runs under a per-collection mutex. The
//! files themselves stay last-writer-wins across processes; the lock only
//! closes the in-process race.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

/// The four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Uploaded scroll corpus (array).
    Scrolls,
    /// Registered seeker profiles (object by seeker id).
    Seekers,
    /// Anonymous visitor ledger (object by visitor id).
    Visitors,
    /// Append-only interaction log (array).
    Transcript,
}

impl Collection {
    /// Backing file name, kept identical to the historical layout.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Scrolls => "scroll_data.json",
            Collection::Seekers => "seekers.json",
            Collection::Visitors => "visitors.json",
            Collection::Transcript => "oracle_log.json",
        }
    }
}

/// File-backed store for the temple collections.
#[derive(Debug)]
pub struct TempleStore {
    dir: PathBuf,
    scrolls_lock: Mutex<()>,
    seekers_lock: Mutex<()>,
    visitors_lock: Mutex<()>,
    transcript_lock: Mutex<()>,
}

impl TempleStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            scrolls_lock: Mutex::new(()),
            seekers_lock: Mutex::new(()),
            visitors_lock: Mutex::new(()),
            transcript_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read an array collection, substituting an empty vec on any failure.
    pub fn read_array<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        self.read_or_default(collection)
    }

    /// Read a map collection, substituting an empty map on any failure.
    pub fn read_map<T: DeserializeOwned>(&self, collection: Collection) -> BTreeMap<String, T> {
        self.read_or_default(collection)
    }

    /// Guarded read-modify-write over an array collection.
    ///
    /// The closure's return value is passed through on successful save.
    pub fn update_array<T, R>(
        &self,
        collection: Collection,
        mutate: impl FnOnce(&mut Vec<T>) -> R,
    ) -> io::Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock_for(collection).lock();
        let mut items: Vec<T> = self.read_or_default(collection);
        let out = mutate(&mut items);
        self.save(collection, &items)?;
        Ok(out)
    }

    /// Guarded read-modify-write over a map collection.
    pub fn update_map<T, R>(
        &self,
        collection: Collection,
        mutate: impl FnOnce(&mut BTreeMap<String, T>) -> R,
    ) -> io::Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock_for(collection).lock();
        let mut items: BTreeMap<String, T> = self.read_or_default(collection);
        let out = mutate(&mut items);
        self.save(collection, &items)?;
        Ok(out)
    }

    /// Replace a collection wholesale (used by the scroll reset).
    pub fn replace<T: Serialize>(&self, collection: Collection, value: &T) -> io::Result<()> {
        let _guard = self.lock_for(collection).lock();
        self.save(collection, value)
    }

    fn lock_for(&self, collection: Collection) -> &Mutex<()> {
        match collection {
            Collection::Scrolls => &self.scrolls_lock,
            Collection::Seekers => &self.seekers_lock,
            Collection::Visitors => &self.visitors_lock,
            Collection::Transcript => &self.transcript_lock,
        }
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, collection: Collection) -> T {
        let path = self.dir.join(collection.file_name());
        match fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                match serde_json::from_str(&content) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(
                            file = collection.file_name(),
                            "discarding unparseable collection file: {}",
                            e
                        );
                        T::default()
                    }
                }
            }
            _ => T::default(),
        }
    }

    /// Serialize and atomically replace the backing file.
    fn save<T: Serialize>(&self, collection: Collection, value: &T) -> io::Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(self.dir.join(collection.file_name()))
            .map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TempleStore) {
        let dir = TempDir::new().unwrap();
        let store = TempleStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_read_missing_file_yields_defaults() {
        let (_dir, store) = store();
        let scrolls: Vec<serde_json::Value> = store.read_array(Collection::Scrolls);
        assert!(scrolls.is_empty());
        let seekers: BTreeMap<String, serde_json::Value> = store.read_map(Collection::Seekers);
        assert!(seekers.is_empty());
    }

    #[test]
    fn test_read_corrupt_file_yields_defaults() {
        let (dir, store) = store();
        fs::write(dir.path().join("visitors.json"), "{not json").unwrap();
        let visitors: BTreeMap<String, serde_json::Value> = store.read_map(Collection::Visitors);
        assert!(visitors.is_empty());
    }

    #[test]
    fn test_update_array_round_trip() {
        let (_dir, store) = store();
        store
            .update_array(Collection::Scrolls, |items: &mut Vec<String>| {
                items.push("first".to_string());
            })
            .unwrap();
        store
            .update_array(Collection::Scrolls, |items: &mut Vec<String>| {
                items.push("second".to_string());
            })
            .unwrap();
        let items: Vec<String> = store.read_array(Collection::Scrolls);
        assert_eq!(items, vec!["first", "second"]);
    }

    #[test]
    fn test_update_map_round_trip() {
        let (_dir, store) = store();
        store
            .update_map(Collection::Seekers, |map: &mut BTreeMap<String, u64>| {
                map.insert("abc".to_string(), 1);
            })
            .unwrap();
        let map: BTreeMap<String, u64> = store.read_map(Collection::Seekers);
        assert_eq!(map.get("abc"), Some(&1));
    }

    #[test]
    fn test_replace_truncates() {
        let (_dir, store) = store();
        store
            .update_array(Collection::Scrolls, |items: &mut Vec<u64>| items.push(7))
            .unwrap();
        store.replace(Collection::Scrolls, &Vec::<u64>::new()).unwrap();
        let items: Vec<u64> = store.read_array(Collection::Scrolls);
        assert!(items.is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let (_dir, store) = store();
        store
            .update_array(Collection::Transcript, |items: &mut Vec<u64>| items.push(1))
            .unwrap();
        let scrolls: Vec<u64> = store.read_array(Collection::Scrolls);
        assert!(scrolls.is_empty());
    }

    #[test]
    fn test_file_names_match_layout() {
        assert_eq!(Collection::Scrolls.file_name(), "scroll_data.json");
        assert_eq!(Collection::Seekers.file_name(), "seekers.json");
        assert_eq!(Collection::Visitors.file_name(), "visitors.json");
        assert_eq!(Collection::Transcript.file_name(), "oracle_log.json");
    }
}

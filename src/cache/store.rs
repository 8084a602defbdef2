// src/cache/store.rs
// =============================================================================
// Durable cache of fetched user records, keyed by username.
//
// On disk it is a single JSON document, {"users": [...]}, living next to
// the binary's working directory as `.users_cache`. It is loaded once at
// startup and written back once after a successful crawl; entries are only
// ever inserted or overwritten, never deleted.
//
// Persisting writes to a sibling temp file and renames it over the store,
// so a crash mid-write leaves the previous valid store in place.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::UserRecord;

pub const CACHE_FILE_NAME: &str = ".users_cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot read cache file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache file '{}' is not a valid user store: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write cache file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// The on-disk shape: every record under one top-level key.
#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    users: Vec<UserRecord>,
}

/// In-memory view of the persisted user store. Shared immutably with the
/// crawl engine while a crawl runs; mutated only through `merge` once the
/// crawl's records are final.
#[derive(Debug)]
pub struct UserCache {
    path: PathBuf,
    entries: HashMap<String, UserRecord>,
}

impl UserCache {
    /// Loads the store at `path`, creating an empty one (persisted
    /// immediately, so a store exists after the first run) when the file
    /// is missing. An unreadable or malformed store degrades to an empty
    /// cache with a warning; it never aborts the program.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if !path.exists() {
            let cache = UserCache {
                path,
                entries: HashMap::new(),
            };
            if let Err(err) = cache.persist() {
                eprintln!("  Warning: could not create a fresh cache store: {err}");
            }
            return cache;
        }

        let entries = match read_document(&path) {
            Ok(document) => document
                .users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
            Err(err) => {
                eprintln!("  Warning: {err}; starting with an empty cache");
                HashMap::new()
            }
        };

        UserCache { path, entries }
    }

    /// Looks up a previously fetched record by username.
    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.entries.get(username)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds a crawl's records into the store. New usernames are inserted;
    /// existing ones are overwritten only in refresh mode, where the
    /// freshly fetched data is newer than what the store holds.
    pub fn merge(&mut self, records: &[UserRecord], refresh: bool) {
        for record in records {
            if refresh || !self.entries.contains_key(&record.username) {
                self.entries.insert(record.username.clone(), record.clone());
            }
        }
    }

    /// Writes the full mapping back to disk, records sorted by username so
    /// the document is stable across runs. The write goes to a temp file
    /// first and is renamed into place.
    pub fn persist(&self) -> Result<(), CacheError> {
        let mut users: Vec<UserRecord> = self.entries.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let json = serde_json::to_string_pretty(&CacheDocument { users })
            .expect("user records always serialize");

        let tmp_path = tmp_sibling(&self.path);
        fs::write(&tmp_path, json).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn read_document(path: &Path) -> Result<CacheDocument, CacheError> {
    let raw = fs::read_to_string(path).map_err(|source| CacheError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CacheError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

// `.users_cache` -> `.users_cache.tmp`, in the same directory so the final
// rename stays on one filesystem.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

//! File-based cache implementation.
//!
//! [`FileCache`] stores cache entries as files on disk, organized into buckets
//! (subdirectories). Keys may be arbitrarily long (diagram keys embed the
//! encoded diagram source), so each entry lives in a file named after the
//! SHA-256 of its key. The file starts with the full key and the data length
//! so that a read can verify it found a complete entry for the right key:
//!
//! ```text
//! [key_len: u32 LE][key bytes][data_len: u64 LE][data bytes]
//! ```
//!
//! Entries are written to a temporary file in the bucket and renamed into
//! place, so readers see either the old entry or the new one.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated, so entries written by an incompatible build are never used.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- diagrams/          # bucket "diagrams"
///     +-- 3f9a...e1      # entry, named by sha256(key)
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(hex::encode(digest))
    }

    fn write_entry(&self, path: &Path, key: &str, value: &[u8]) -> io::Result<()> {
        let key_len = u32::try_from(key.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "cache key too long"))?;
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&key_len.to_le_bytes())?;
        tmp.write_all(key.as_bytes())?;
        tmp.write_all(&(value.len() as u64).to_le_bytes())?;
        tmp.write_all(value)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let mut file = File::open(&path).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let key_len = u32::from_le_bytes(len_buf) as usize;

        let mut stored_key = vec![0u8; key_len];
        file.read_exact(&mut stored_key).ok()?;
        if stored_key != key.as_bytes() {
            tracing::warn!("cache entry {} holds a different key", path.display());
            return None;
        }

        let mut len_buf = [0u8; 8];
        file.read_exact(&mut len_buf).ok()?;
        let data_len = u64::from_le_bytes(len_buf);

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        if data.len() as u64 != data_len {
            tracing::warn!(
                expected = data_len,
                found = data.len(),
                "cache entry {} is incomplete",
                path.display()
            );
            return None;
        }
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8]) {
        let path = self.entry_path(key);
        if let Err(e) = self.write_entry(&path, key, value) {
            tracing::debug!("failed to write cache entry {}: {e}", path.display());
        }
    }
}

/// State of the `VERSION` marker relative to the running build.
#[derive(Debug, PartialEq, Eq)]
enum VersionState {
    Current,
    Stale(String),
    Missing,
}

fn version_state(version_file: &Path, version: &str) -> VersionState {
    match fs::read_to_string(version_file) {
        Ok(stored) if stored.trim() == version => VersionState::Current,
        Ok(stored) => VersionState::Stale(stored.trim().to_owned()),
        Err(_) => VersionState::Missing,
    }
}

/// Make sure `root` only holds entries written by `version`.
///
/// A stale or missing marker empties the directory and stamps the new
/// version. I/O problems are logged; the cache then simply misses.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");
    match version_state(&version_file, version) {
        VersionState::Current => return,
        VersionState::Stale(stored) => {
            tracing::info!(%stored, %version, "Diagram cache written by another version, clearing");
        }
        VersionState::Missing => tracing::debug!(root = %root.display(), "Creating diagram cache"),
    }

    let reset = || -> std::io::Result<()> {
        if root.exists() {
            fs::remove_dir_all(root)?;
        }
        fs::create_dir_all(root)?;
        fs::write(&version_file, version)
    };
    if let Err(e) = reset() {
        tracing::warn!(root = %root.display(), "Failed to reset diagram cache: {e}");
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::ENGINE_VERSION;

/// Identity of a memoised build artifact. Two builds share a file exactly
/// when their key renders to the same name.
#[derive(Debug, Clone)]
pub struct CacheKey {
    /// `'3'` for graph artifacts, `'4'` for timetable templates.
    pub prefix: char,
    pub high_speed: bool,
    pub walking_wild: bool,
    /// Snapshot file version, `YYYYMMDD-HHMM` of its mtime.
    pub version1: String,
    /// Interval or departure file version, same rendering.
    pub version2: String,
    /// The permanent ignored-lines list, order preserved.
    pub permanent_ignored: Vec<String>,
}

impl CacheKey {
    pub fn file_name(&self) -> String {
        let ignored: Vec<u8> = self
            .permanent_ignored
            .iter()
            .flat_map(|line| line.as_bytes().iter().copied())
            .collect();
        format!(
            "{}{}{}-{}-{}-{:x}-{}.dat",
            self.prefix,
            u8::from(self.high_speed),
            u8::from(self.walking_wild),
            self.version1,
            self.version2,
            md5::compute(&ignored),
            ENGINE_VERSION,
        )
    }

    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// A file's mtime rendered for cache-key versioning, UTC.
pub fn version_string(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let stamp: DateTime<Utc> = modified.into();
    Some(stamp.format("%Y%m%d-%H%M").to_string())
}

/// Reads an artifact back. Any failure — absent file, truncated write,
/// layout drift — is a miss; corrupt files are deleted so the next store
/// starts clean.
pub fn load<T: DeserializeOwned>(dir: &Path, key: &CacheKey) -> Option<T> {
    let path = key.path(dir);
    let bytes = fs::read(&path).ok()?;
    match bincode::deserialize(&bytes) {
        Ok(value) => {
            debug!(path = %path.display(), "cache hit");
            Some(value)
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "corrupt cache artifact, rebuilding");
            let _ = fs::remove_file(&path);
            None
        }
    }
}

/// Writes an artifact through a sibling temp file and an atomic rename.
/// Best-effort: an existing file is left alone, and IO failures only log.
pub fn store<T: Serialize>(dir: &Path, key: &CacheKey, value: &T) {
    let path = key.path(dir);
    if path.exists() {
        return;
    }
    if let Err(err) = fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), %err, "cannot create cache directory");
        return;
    }
    let bytes = match bincode::serialize(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%err, "cache artifact did not serialize");
            return;
        }
    };
    let tmp = dir.join(format!("{}.tmp{}", key.file_name(), process::id()));
    if let Err(err) = fs::write(&tmp, bytes) {
        warn!(path = %tmp.display(), %err, "cache write failed");
        return;
    }
    if let Err(err) = fs::rename(&tmp, &path) {
        warn!(path = %path.display(), %err, "cache rename failed");
        let _ = fs::remove_file(&tmp);
    }
}

#[test]
fn file_name_encodes_flags() {
    let key = CacheKey {
        prefix: '3',
        high_speed: true,
        walking_wild: false,
        version1: "20260801-0900".to_string(),
        version2: "20260801-0905".to_string(),
        permanent_ignored: vec![],
    };
    let name = key.file_name();
    assert!(name.starts_with("310-20260801-0900-20260801-0905-"));
    assert!(name.ends_with(".dat"));
}

#[test]
fn digest_depends_on_ignored_list() {
    let base = CacheKey {
        prefix: '4',
        high_speed: true,
        walking_wild: true,
        version1: "20260801-0900".to_string(),
        version2: "20260801-0905".to_string(),
        permanent_ignored: vec![],
    };
    let mut other = base.clone();
    other.permanent_ignored = vec!["环线".to_string()];
    assert_ne!(base.file_name(), other.file_name());
}

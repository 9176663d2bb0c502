//! Local fallback cache for records the backend store rejected

use crate::extract::InfoRecord;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// File name suffix of every cache file
pub const CACHE_SUFFIX: &str = "_cache_infos.json";

/// Writes one pretty-printed JSON file per rejected record
///
/// Files are named `<YYYYMMDDHHMMSS>_cache_infos.json` after local time.
/// Two records cached in the same second get `_1`, `_2`, ... inserted
/// before the suffix; existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct FallbackCache {
    dir: PathBuf,
}

impl FallbackCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes a record and returns the path of the new file
    pub fn write(&self, record: &InfoRecord) -> io::Result<PathBuf> {
        self.write_at(record, Local::now())
    }

    fn write_at(&self, record: &InfoRecord, now: DateTime<Local>) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let stamp = now.format("%Y%m%d%H%M%S").to_string();
        let json = serde_json::to_vec_pretty(record)?;

        let mut attempt = 0u32;
        loop {
            let path = self.dir.join(cache_file_name(&stamp, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&json)?;
                    file.flush()?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Lists cache files currently in the directory, sorted by name
    pub fn entries(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        if !self.dir.exists() {
            return Ok(paths);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_cache = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(CACHE_SUFFIX));
            if is_cache {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn cache_file_name(stamp: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}{}", stamp, CACHE_SUFFIX)
    } else {
        format!("{}_{}{}", stamp, attempt, CACHE_SUFFIX)
    }
}

//! L2 on-disk cache: persists `IrDocument`s across process restarts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::shared::models::IrDocument;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct FileCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_written: u64,
}

pub struct FileCache {
    dir: PathBuf,
    hits: AtomicU64,
    misses: AtomicU64,
    entries_written: AtomicU64,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            entries_written: AtomicU64::new(0),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn get(&self, key: &str) -> Option<IrDocument> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                serde_json::from_slice(&bytes).ok()
            }
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn set(&self, key: &str, doc: &IrDocument) -> std::io::Result<()> {
        let bytes = serde_json::to_vec(doc).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.path_for(key), bytes)?;
        self.entries_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn clear(&self) -> std::io::Result<()> {
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let entry = entry?;
                if entry.path().extension().map(|e| e == "json").unwrap_or(false) {
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> usize {
        fs::read_dir(&self.dir)
            .map(|rd| rd.filter_map(|e| e.ok()).filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false)).count())
            .unwrap_or(0)
    }

    pub fn stats(&self) -> FileCacheStats {
        FileCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries_written: self.entries_written.load(Ordering::Relaxed),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! Incremental indexing: mtime/size fast path, content-hash slow path,
//! change-set computation (§4.7).

use std::collections::HashMap;

use crate::shared::utils::content_hash;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileMetadata {
    pub mtime: i64,
    pub size: u64,
    pub content_hash: String,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct IndexingStats {
    pub total_checked: usize,
    pub actually_changed: usize,
    pub false_positives: usize,
}

/// A candidate file observed on disk during a re-scan.
pub struct ObservedFile {
    pub path: String,
    pub mtime: i64,
    pub size: u64,
    pub content: String,
}

pub struct IncrementalIndexer {
    fast_path_enabled: bool,
}

impl IncrementalIndexer {
    pub fn new(fast_path_enabled: bool) -> Self {
        Self { fast_path_enabled }
    }

    /// Computes the change set against a previous `FileMetadata` snapshot.
    /// Fast path: `(mtime, size)` unchanged => unchanged, hash not computed.
    /// Slow path: hash mismatch is required to mark a file modified; an
    /// apparent mtime/size change with an unchanged hash is reported as a
    /// false positive and the file is *not* included in `modified`.
    pub fn compute_change_set(
        &self,
        previous: &HashMap<String, FileMetadata>,
        observed: &[ObservedFile],
    ) -> (ChangeSet, IndexingStats, HashMap<String, FileMetadata>) {
        let mut change_set = ChangeSet::default();
        let mut stats = IndexingStats::default();
        let mut next_metadata = HashMap::new();
        let mut seen = std::collections::HashSet::new();

        for file in observed {
            stats.total_checked += 1;
            seen.insert(file.path.clone());

            match previous.get(&file.path) {
                None => {
                    let hash = content_hash(&file.content);
                    change_set.added.push(file.path.clone());
                    stats.actually_changed += 1;
                    next_metadata.insert(file.path.clone(), FileMetadata { mtime: file.mtime, size: file.size, content_hash: hash });
                }
                Some(prev) => {
                    let apparently_unchanged = self.fast_path_enabled && prev.mtime == file.mtime && prev.size == file.size;
                    if apparently_unchanged {
                        next_metadata.insert(file.path.clone(), prev.clone());
                        continue;
                    }
                    let hash = content_hash(&file.content);
                    if hash == prev.content_hash {
                        stats.false_positives += 1;
                        next_metadata.insert(
                            file.path.clone(),
                            FileMetadata { mtime: file.mtime, size: file.size, content_hash: hash },
                        );
                    } else {
                        change_set.modified.push(file.path.clone());
                        stats.actually_changed += 1;
                        next_metadata.insert(
                            file.path.clone(),
                            FileMetadata { mtime: file.mtime, size: file.size, content_hash: hash },
                        );
                    }
                }
            }
        }

        for path in previous.keys() {
            if !seen.contains(path) {
                change_set.deleted.push(path.clone());
            }
        }

        (change_set, stats, next_metadata)
    }
}

//! Co-change coupling analysis over git history (§4.15), grounded on
//! `git_manager.py`'s workspace-scoped repository handling and the
//! coupling-strength definition named in spec: co-occurrences / total
//! commits touching either file.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::warn;

use crate::errors::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct CoChangePattern {
    pub file_a: String,
    pub file_b: String,
    pub cochange_count: u64,
    pub file_a_changes: u64,
    pub file_b_changes: u64,
    pub coupling_strength: f64,
    pub confidence_a_to_b: f64,
    pub confidence_b_to_a: f64,
}

pub struct CoChangeAnalyzer {
    repo_path: PathBuf,
}

impl CoChangeAnalyzer {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self { repo_path: repo_path.as_ref().to_path_buf() }
    }

    fn changed_files(repo: &Repository, oid: git2::Oid) -> CoreResult<HashSet<String>> {
        let commit = repo.find_commit(oid).map_err(|e| CoreError::External { message: e.to_string() })?;
        let tree = commit.tree().map_err(|e| CoreError::External { message: e.to_string() })?;
        let parent_tree = commit.parents().next().and_then(|p| p.tree().ok());

        let diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .map_err(|e| CoreError::External { message: e.to_string() })?;

        let mut files = HashSet::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                files.insert(path.to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }

    /// Finds file pairs with co-change coupling above the given thresholds,
    /// scanning up to `days` of history.
    pub fn find_strong_couples(&self, days: i64, min_cochanges: u64, min_coupling: f64) -> CoreResult<Vec<CoChangePattern>> {
        let repo = match Repository::open(&self.repo_path) {
            Ok(repo) => repo,
            Err(e) => {
                warn!(error = %e, path = %self.repo_path.display(), "co_change_repo_open_failed");
                return Ok(Vec::new());
            }
        };

        let cutoff = chrono::Utc::now().timestamp() - days * 86_400;

        let mut revwalk = repo.revwalk().map_err(|e| CoreError::External { message: e.to_string() })?;
        revwalk.push_head().map_err(|e| CoreError::External { message: e.to_string() })?;

        let mut per_file_commits: HashMap<String, u64> = HashMap::new();
        let mut pair_counts: HashMap<(String, String), u64> = HashMap::new();

        for oid in revwalk {
            let oid = oid.map_err(|e| CoreError::External { message: e.to_string() })?;
            let commit = repo.find_commit(oid).map_err(|e| CoreError::External { message: e.to_string() })?;
            if commit.time().seconds() < cutoff {
                continue;
            }

            let files = Self::changed_files(&repo, oid)?;
            let mut sorted: Vec<&String> = files.iter().collect();
            sorted.sort();

            for f in &sorted {
                *per_file_commits.entry((*f).clone()).or_insert(0) += 1;
            }
            for i in 0..sorted.len() {
                for j in (i + 1)..sorted.len() {
                    let pair = (sorted[i].clone(), sorted[j].clone());
                    *pair_counts.entry(pair).or_insert(0) += 1;
                }
            }
        }

        let mut patterns = Vec::new();
        for ((file_a, file_b), cochange_count) in pair_counts {
            if cochange_count < min_cochanges {
                continue;
            }
            let a_changes = *per_file_commits.get(&file_a).unwrap_or(&0);
            let b_changes = *per_file_commits.get(&file_b).unwrap_or(&0);
            let union_changes = a_changes + b_changes - cochange_count;
            if union_changes == 0 {
                continue;
            }
            let coupling_strength = cochange_count as f64 / union_changes as f64;
            if coupling_strength < min_coupling {
                continue;
            }
            let confidence_a_to_b = if a_changes > 0 { cochange_count as f64 / a_changes as f64 } else { 0.0 };
            let confidence_b_to_a = if b_changes > 0 { cochange_count as f64 / b_changes as f64 } else { 0.0 };

            patterns.push(CoChangePattern {
                file_a,
                file_b,
                cochange_count,
                file_a_changes: a_changes,
                file_b_changes: b_changes,
                coupling_strength,
                confidence_a_to_b,
                confidence_b_to_a,
            });
        }

        patterns.sort_by(|a, b| b.coupling_strength.partial_cmp(&a.coupling_strength).unwrap_or(std::cmp::Ordering::Equal));
        Ok(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo_with_history() -> TempDir {
        let dir = TempDir::new().unwrap();
        let run = |args: &[&str]| {
            Command::new("git").current_dir(dir.path()).args(args).output().expect("git available");
        };
        run(&["init", "-q"]);
        run(&["config", "user.email", "a@example.com"]);
        run(&["config", "user.name", "tester"]);

        for i in 0..4 {
            std::fs::write(dir.path().join("a.rs"), format!("content {i}")).unwrap();
            std::fs::write(dir.path().join("b.rs"), format!("content {i}")).unwrap();
            run(&["add", "-A"]);
            run(&["commit", "-q", "-m", &format!("commit {i}")]);
        }
        dir
    }

    #[test]
    fn couples_frequently_changed_together_files() {
        let dir = init_repo_with_history();
        let analyzer = CoChangeAnalyzer::new(dir.path());
        let patterns = analyzer.find_strong_couples(3650, 2, 0.1).unwrap();
        assert!(patterns.iter().any(|p| {
            (p.file_a == "a.rs" && p.file_b == "b.rs") || (p.file_a == "b.rs" && p.file_b == "a.rs")
        }));
    }

    #[test]
    fn missing_repo_returns_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let analyzer = CoChangeAnalyzer::new(dir.path());
        let patterns = analyzer.find_strong_couples(90, 3, 0.2).unwrap();
        assert!(patterns.is_empty());
    }
}

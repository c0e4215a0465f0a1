//! Deterministic, content-addressed identifier generation.
//!
//! Hashing is SHA-256 over a stable canonical concatenation of the input
//! fields, truncated to the hex width the ID format calls for. SHA-256 is
//! used (rather than `DefaultHasher`) so that IDs are stable across Rust
//! versions and machines, per the cross-machine determinism requirement.

use sha2::{Digest, Sha256};

fn hash_hex(parts: &[&str], hex_len: usize) -> String {
    let mut hasher = Sha256::new();
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\x1f"); // unit separator, avoids field-concat ambiguity
        }
        hasher.update(p.as_bytes());
    }
    let digest = hasher.finalize();
    let full = hex::encode(digest);
    full[..hex_len.min(full.len())].to_string()
}

// Minimal local hex encoder to avoid pulling in the `hex` crate for one call site.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            s.push_str(&format!("{:02x}", b));
        }
        s
    }
}

pub struct IdStrategy;

impl IdStrategy {
    /// `node:{repo_id}:{kind_lowercase}:{24-hex-hash}`
    pub fn node_id(repo_id: &str, language: &str, kind: &str, fqn: &str, file_path: &str, signature: &str) -> String {
        let kind_lc = kind.to_lowercase();
        let hash = hash_hex(&[language, &kind_lc, fqn, file_path, signature], 24);
        format!("node:{repo_id}:{kind_lc}:{hash}")
    }

    /// `edge:{kind_lowercase}:{20-hex-hash}`
    pub fn edge_id(kind: &str, source_id: &str, target_id: &str, occurrence_counter: u64) -> String {
        let kind_lc = kind.to_lowercase();
        let counter = occurrence_counter.to_string();
        let hash = hash_hex(&[&kind_lc, source_id, target_id, &counter], 20);
        format!("edge:{kind_lc}:{hash}")
    }

    /// `expr:{repo_id}:{file_path}:{line}:{col}:{counter}`
    pub fn expression_id(repo_id: &str, file_path: &str, line: u32, col: u32, counter: u64) -> String {
        format!("expr:{repo_id}:{file_path}:{line}:{col}:{counter}")
    }

    /// `occ:{n}`, monotonically assigned by the caller.
    pub fn occurrence_id(n: u64) -> String {
        format!("occ:{n}")
    }

    pub fn bfg_block_id(function_id: &str, block_index: usize) -> String {
        format!("bfg:{function_id}:block:{block_index}")
    }

    pub fn dfg_node_id(function_id: &str, variable: &str, version: u32) -> String {
        format!("dfg:{function_id}:{variable}:v{version}")
    }
}

/// General-purpose content hash used for cache keys and Node content hashes.
/// Whitespace-sensitive by design (§9): any byte change alters the hash.
pub fn content_hash(content: &str) -> String {
    hash_hex(&[content], 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_deterministic() {
        let a = IdStrategy::node_id("repo1", "python", "Function", "mod.f", "mod.py", "f()");
        let b = IdStrategy::node_id("repo1", "python", "Function", "mod.f", "mod.py", "f()");
        assert_eq!(a, b);
        assert!(a.starts_with("node:repo1:function:"));
    }

    #[test]
    fn node_id_distinct_for_distinct_input() {
        let a = IdStrategy::node_id("repo1", "python", "function", "mod.f", "mod.py", "f()");
        let b = IdStrategy::node_id("repo1", "python", "function", "mod.g", "mod.py", "g()");
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_whitespace_sensitive() {
        assert_ne!(content_hash("def f(): pass"), content_hash("def f():  pass"));
    }

    #[test]
    fn edge_id_format() {
        let id = IdStrategy::edge_id("Calls", "node:a", "node:b", 0);
        assert!(id.starts_with("edge:calls:"));
        assert_eq!(id.len(), "edge:calls:".len() + 20);
    }

    #[test]
    fn bfg_and_dfg_ids_are_structural_not_hashed() {
        assert_eq!(IdStrategy::bfg_block_id("f1", 2), "bfg:f1:block:2");
        assert_eq!(IdStrategy::dfg_node_id("f1", "x", 3), "dfg:f1:x:v3");
    }
}

//! Cross-file resolution: global symbol table, import resolution cascade,
//! dependency graph, topological order, incremental affected-set recompute
//! (§4.5).

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;
use rayon::prelude::*;

use crate::shared::models::{EdgeKind, Node};

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub node: Node,
    pub file_path: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedImport {
    pub edge_id: String,
    pub resolved_file: Option<String>,
    pub resolved_node_id: Option<String>,
    pub resolved_module: Option<String>,
}

/// One file's worth of resolver input: its Nodes and its `IMPORTS` edges
/// with the raw imported name attached.
#[derive(Clone)]
pub struct FileUnit {
    pub file_path: String,
    pub nodes: Vec<Node>,
    /// (edge_id, imported_name) pairs for this file's IMPORTS edges.
    pub imports: Vec<(String, String)>,
}

pub struct CrossFileResolver {
    pub symbol_table: HashMap<String, SymbolEntry>,
    pub dependencies: HashMap<String, HashSet<String>>,
    pub dependents: HashMap<String, HashSet<String>>,
}

impl CrossFileResolver {
    pub fn new() -> Self {
        Self {
            symbol_table: HashMap::new(),
            dependencies: HashMap::new(),
            dependents: HashMap::new(),
        }
    }

    /// Builds the global symbol table over every Node with a non-empty fqn.
    pub fn build_symbol_table(&mut self, units: &[FileUnit]) {
        for unit in units {
            for node in &unit.nodes {
                if !node.fqn.is_empty() {
                    self.symbol_table.insert(
                        node.fqn.clone(),
                        SymbolEntry { node: node.clone(), file_path: unit.file_path.clone() },
                    );
                }
            }
        }
    }

    /// Resolves a single imported name via the 4-strategy cascade:
    /// (a) exact FQN match, (b) progressively-shortened dotted match,
    /// (c) common module-path patterns, (d) relative-import dot counting.
    fn resolve_name(&self, importing_file: &str, name: &str) -> Option<(String, String, String)> {
        if let Some(entry) = self.symbol_table.get(name) {
            return Some((entry.file_path.clone(), entry.node.id.clone(), name.to_string()));
        }

        let mut parts: Vec<&str> = name.split('.').collect();
        while parts.len() > 1 {
            parts.pop();
            let candidate = parts.join(".");
            if let Some(entry) = self.symbol_table.get(&candidate) {
                return Some((entry.file_path.clone(), entry.node.id.clone(), candidate));
            }
        }

        for pattern in [format!("{name}.py"), format!("src/{name}.py"), format!("{name}/__init__.py")] {
            if let Some(entry) = self.symbol_table.values().find(|e| e.file_path == pattern) {
                return Some((entry.file_path.clone(), entry.node.id.clone(), name.to_string()));
            }
        }

        if let Some(stripped) = name.strip_prefix('.') {
            let dots = name.len() - stripped.len();
            let importing_dir: Vec<&str> = importing_file.rsplitn(2, '/').nth(1).into_iter().collect();
            let base = importing_dir.first().copied().unwrap_or("");
            let mut components: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
            for _ in 1..dots {
                components.pop();
            }
            let candidate_prefix = components.join(".");
            let full = if candidate_prefix.is_empty() { stripped.to_string() } else { format!("{candidate_prefix}.{stripped}") };
            if let Some(entry) = self.symbol_table.get(&full) {
                return Some((entry.file_path.clone(), entry.node.id.clone(), full));
            }
        }

        None
    }

    /// Resolves every file's imports in parallel; unresolved imports are
    /// simply omitted (partial resolution is allowed, §4.5 failure
    /// semantics).
    pub fn resolve_imports(&mut self, units: &[FileUnit]) -> Vec<ResolvedImport> {
        let resolved: Vec<ResolvedImport> = units
            .par_iter()
            .flat_map(|unit| {
                unit.imports
                    .par_iter()
                    .filter_map(|(edge_id, name)| {
                        self.resolve_name(&unit.file_path, name).map(|(file, node_id, module)| ResolvedImport {
                            edge_id: edge_id.clone(),
                            resolved_file: Some(file),
                            resolved_node_id: Some(node_id),
                            resolved_module: Some(module),
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        for (unit, resolved_import) in units.iter().zip(resolved.iter()) {
            if let Some(target_file) = &resolved_import.resolved_file {
                self.dependencies.entry(unit.file_path.clone()).or_default().insert(target_file.clone());
                self.dependents.entry(target_file.clone()).or_default().insert(unit.file_path.clone());
            }
        }

        resolved
    }

    /// Kahn's algorithm. Cyclic subgraphs are appended in arbitrary
    /// (but deterministic, sorted) order after the acyclic prefix so the
    /// function never fails to return a full ordering.
    pub fn topological_order(&self) -> Vec<String> {
        let mut all_files: BTreeMap<String, ()> = BTreeMap::new();
        for (f, deps) in &self.dependencies {
            all_files.insert(f.clone(), ());
            for d in deps {
                all_files.insert(d.clone(), ());
            }
        }

        let mut in_degree: HashMap<String, usize> = all_files.keys().map(|f| (f.clone(), 0)).collect();
        for deps in self.dependencies.values() {
            for d in deps {
                *in_degree.entry(d.clone()).or_insert(0) += 0;
            }
        }
        // in-degree here counts "number of files this file depends on that haven't been emitted".
        for (f, deps) in &self.dependencies {
            *in_degree.get_mut(f).unwrap() = deps.len();
        }

        let mut queue: VecDeque<String> = in_degree.iter().filter(|(_, d)| **d == 0).map(|(f, _)| f.clone()).collect();
        let mut queue_vec: Vec<String> = queue.drain(..).collect();
        queue_vec.sort();
        let mut queue: VecDeque<String> = queue_vec.into();

        let mut order = Vec::new();
        let mut emitted: HashSet<String> = HashSet::new();

        while let Some(file) = queue.pop_front() {
            if emitted.contains(&file) {
                continue;
            }
            order.push(file.clone());
            emitted.insert(file.clone());
            if let Some(dependents) = self.dependents.get(&file) {
                let mut newly_ready: Vec<String> = Vec::new();
                for dep in dependents {
                    if let Some(count) = in_degree.get_mut(dep) {
                        if *count > 0 {
                            *count -= 1;
                        }
                        if *count == 0 && !emitted.contains(dep) {
                            newly_ready.push(dep.clone());
                        }
                    }
                }
                newly_ready.sort();
                for f in newly_ready {
                    queue.push_back(f);
                }
            }
        }

        let mut remaining: Vec<String> = all_files.keys().filter(|f| !emitted.contains(*f)).cloned().collect();
        remaining.sort();
        order.extend(remaining);
        order
    }

    /// Closure-of-dependents affected set for the given changed files,
    /// computed as a BFS over the dependents graph.
    pub fn affected_set(&self, changed: &[String]) -> HashSet<String> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for file in self.dependents.keys() {
            graph.add_node(file.as_str());
        }
        for (file, deps) in &self.dependents {
            for dep in deps {
                graph.add_edge(file.as_str(), dep.as_str(), ());
            }
        }

        let mut affected: HashSet<String> = changed.iter().cloned().collect();
        for root in changed {
            if !graph.contains_node(root.as_str()) {
                continue;
            }
            let mut bfs = Bfs::new(&graph, root.as_str());
            while let Some(node) = bfs.next(&graph) {
                affected.insert(node.to_string());
            }
        }
        affected
    }
}

impl Default for CrossFileResolver {
    fn default() -> Self {
        Self::new()
    }
}

pub const IMPORT_EDGE_KIND: EdgeKind = EdgeKind::Imports;

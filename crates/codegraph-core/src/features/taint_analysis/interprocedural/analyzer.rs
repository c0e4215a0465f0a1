//! `DeepAnalyzer`: composes the k-CFA `ContextManager` and `AliasAnalyzer`
//! to propagate taint across `CALL_ARG`/`RETURN`/`COLLECTION_*` edges
//! (§4.11). Composition only — does not extend either collaborator (§9).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::{CoreError, CoreResult};
use crate::shared::models::{IdfgEdgeKind, InterproceduralDataFlowEdge, Node, Span};

use super::alias::AliasAnalyzer;
use super::context::{CallContext, ContextManager};

/// Per-function selector sets: `fqn -> {var_names}`. Falls back to the
/// `<global>` scope key when no function scope is given, matching
/// `FlowExpr`'s shape in the source (§4.11).
pub type FlowExpr = HashMap<String, HashSet<String>>;

pub const GLOBAL_SCOPE: &str = "<global>";

#[derive(Debug, Clone)]
pub struct PathResult {
    pub path: Vec<String>,
    pub file_path: String,
    pub span: Span,
    pub confidence: f64,
}

pub struct ProjectContext<'a> {
    pub dfg_edges: &'a [InterproceduralDataFlowEdge],
    /// var_id -> (function_fqn, file_path, span), used to populate
    /// `PathResult` with real locations rather than ID-parsed guesses.
    pub node_map: &'a HashMap<String, Node>,
}

pub struct DeepAnalyzer {
    context_manager: ContextManager,
    alias_analyzer: AliasAnalyzer,
}

impl DeepAnalyzer {
    pub fn new(k_limit: usize) -> Self {
        Self { context_manager: ContextManager::new(k_limit), alias_analyzer: AliasAnalyzer::new() }
    }

    pub fn context_manager_mut(&mut self) -> &mut ContextManager {
        &mut self.context_manager
    }

    pub fn alias_analyzer_mut(&mut self) -> &mut AliasAnalyzer {
        &mut self.alias_analyzer
    }

    fn normalize_selector(selector: &FlowExpr, fqn: Option<&str>) -> HashSet<String> {
        let key = fqn.unwrap_or(GLOBAL_SCOPE);
        selector.get(key).cloned().unwrap_or_default()
    }

    /// Propagates taint from `sources` to `sinks` over `CALL_ARG`/`RETURN`/
    /// `COLLECTION_*` edges. Rejects a missing project context rather than
    /// returning a silent empty result (§4.11 contract).
    ///
    /// Each `CALL_ARG` edge extends the traveling call-string context via
    /// `self.context_manager`, truncated to its `k_limit`. A variable is
    /// revisited only under a context it hasn't already been reached with,
    /// so raising `k` lets call sites that would otherwise collapse onto the
    /// same (var, context) pair be told apart, instead of being a no-op.
    pub fn propagate(&mut self, context: Option<&ProjectContext>, sources: &FlowExpr, sinks: &FlowExpr) -> CoreResult<Vec<PathResult>> {
        let context = context.ok_or_else(|| CoreError::validation("DeepAnalyzer.propagate requires a project context"))?;

        let mut adjacency: HashMap<&str, Vec<&InterproceduralDataFlowEdge>> = HashMap::new();
        for e in context.dfg_edges {
            adjacency.entry(e.from_var_id.as_str()).or_default().push(e);
        }

        let mut source_vars: Vec<(String, String)> = Vec::new();
        for (fqn, vars) in sources {
            for v in vars {
                source_vars.push((fqn.clone(), v.clone()));
            }
        }
        let mut sink_vars: HashSet<String> = HashSet::new();
        for vars in sinks.values() {
            sink_vars.extend(vars.iter().cloned());
        }

        let mut results = Vec::new();
        for (_fqn, source_var) in &source_vars {
            let mut visited: HashSet<(String, CallContext)> = HashSet::new();
            let mut queue: VecDeque<(String, Vec<String>, f64, CallContext)> = VecDeque::new();
            let root_ctx = CallContext::empty();
            queue.push_back((source_var.clone(), vec![source_var.clone()], 1.0, root_ctx.clone()));
            visited.insert((source_var.clone(), root_ctx));

            while let Some((current, path, confidence, ctx)) = queue.pop_front() {
                if sink_vars.contains(&current) {
                    let (file_path, span) = self.lookup_location(context, &current);
                    results.push(PathResult { path: path.clone(), file_path, span, confidence });
                    continue;
                }
                if let Some(edges) = adjacency.get(current.as_str()) {
                    for edge in edges {
                        let next_ctx = match (edge.kind, edge.call_site_id.as_deref(), edge.callee_fqn.as_deref()) {
                            (IdfgEdgeKind::CallArg, Some(call_site), Some(callee_fqn)) => {
                                self.context_manager.record_call(callee_fqn, &ctx, call_site)
                            }
                            _ => ctx.clone(),
                        };
                        let key = (edge.to_var_id.clone(), next_ctx.clone());
                        if visited.contains(&key) {
                            continue;
                        }
                        let decay = match edge.kind {
                            IdfgEdgeKind::CollectionStore | IdfgEdgeKind::CollectionLoad => 0.9,
                            _ => 0.95,
                        };
                        let may_alias_penalty = if self.alias_analyzer.may_alias(&current, &edge.to_var_id)
                            && !self.alias_analyzer.must_alias(&current, &edge.to_var_id)
                        {
                            0.9
                        } else {
                            1.0
                        };
                        let mut next_path = path.clone();
                        next_path.push(edge.to_var_id.clone());
                        visited.insert(key);
                        queue.push_back((edge.to_var_id.clone(), next_path, confidence * decay * may_alias_penalty, next_ctx));
                    }
                }
            }
        }

        Ok(results)
    }

    fn lookup_location(&self, context: &ProjectContext, var_id: &str) -> (String, Span) {
        match context.node_map.get(var_id) {
            Some(node) => (node.file_path.clone(), node.span),
            None => (String::new(), Span::zero()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::NodeKind;

    #[test]
    fn missing_context_is_rejected_not_silently_empty() {
        let mut analyzer = DeepAnalyzer::new(2);
        let sources: FlowExpr = HashMap::new();
        let sinks: FlowExpr = HashMap::new();
        let err = analyzer.propagate(None, &sources, &sinks).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn propagates_across_call_arg_edge_with_real_location() {
        let mut analyzer = DeepAnalyzer::new(2);
        let edges = vec![InterproceduralDataFlowEdge {
            id: "idfg1".into(),
            kind: IdfgEdgeKind::CallArg,
            from_var_id: "dfg:f:x:v0".into(),
            to_var_id: "dfg:g:y:v0".into(),
            call_site_id: Some("call1".into()),
            caller_fqn: Some("f".into()),
            callee_fqn: Some("g".into()),
            arg_position: Some(0),
            collection_var_id: None,
            element_key: None,
        }];
        let mut node_map = HashMap::new();
        node_map.insert(
            "dfg:g:y:v0".to_string(),
            Node::new("dfg:g:y:v0", NodeKind::Variable, "g.y", "sink.py").with_span(Span::new(20, 0, 20, 5)),
        );

        let context = ProjectContext { dfg_edges: &edges, node_map: &node_map };
        let mut sources: FlowExpr = HashMap::new();
        sources.insert("f".into(), ["dfg:f:x:v0".into()].into_iter().collect());
        let mut sinks: FlowExpr = HashMap::new();
        sinks.insert("g".into(), ["dfg:g:y:v0".into()].into_iter().collect());

        let results = analyzer.propagate(Some(&context), &sources, &sinks).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_path, "sink.py");
        assert_eq!(results[0].span.start_line, 20);
        assert!(results[0].confidence < 1.0);
    }

    #[test]
    fn call_arg_edge_records_a_call_string_context() {
        let mut analyzer = DeepAnalyzer::new(2);
        let edges = vec![InterproceduralDataFlowEdge {
            id: "idfg1".into(),
            kind: IdfgEdgeKind::CallArg,
            from_var_id: "dfg:f:x:v0".into(),
            to_var_id: "dfg:g:y:v0".into(),
            call_site_id: Some("call1".into()),
            caller_fqn: Some("f".into()),
            callee_fqn: Some("g".into()),
            arg_position: Some(0),
            collection_var_id: None,
            element_key: None,
        }];
        let node_map = HashMap::new();
        let context = ProjectContext { dfg_edges: &edges, node_map: &node_map };
        let mut sources: FlowExpr = HashMap::new();
        sources.insert("f".into(), ["dfg:f:x:v0".into()].into_iter().collect());
        let sinks: FlowExpr = HashMap::new();

        assert!(analyzer.context_manager_mut().contexts_for("g").is_empty());
        analyzer.propagate(Some(&context), &sources, &sinks).unwrap();
        let contexts = analyzer.context_manager_mut().contexts_for("g");
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].0, vec!["call1".to_string()]);
    }
}

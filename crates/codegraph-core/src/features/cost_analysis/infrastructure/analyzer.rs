//! Loop-bound extraction, nesting computation, complexity classification.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;

use crate::errors::{CoreError, CoreResult};
use crate::features::cost_analysis::domain::{BoundResult, ComplexityClass, CostResult, Hotspot, InferenceMethod, Verdict};
use crate::ports::envelope::{Claim, ConfidenceBasis, Evidence, Provenance, ResultEnvelope, Severity};
use crate::shared::models::{BlockKind, CfgBlock, CfgEdge, CfgEdgeKind, Expression, ExprKind};

/// Extracts the callee's stop-bound argument for a `range(...)` call.
///
/// §4.12 step 2 / §9: a 3-argument `range(start, stop, step)` call must use
/// the *second* argument (the stop bound), not the last one.
pub fn extract_range_bound(args: &[String]) -> Option<String> {
    match args.len() {
        0 => None,
        1 => Some(args[0].clone()),
        _ => Some(args[1].clone()),
    }
}

fn resolve_bound_expr(expr: Option<&Expression>) -> Option<String> {
    let expr = expr?;
    match expr.kind {
        ExprKind::NameLoad => Some(expr.var_name().unwrap_or("?").to_string()),
        ExprKind::Literal => expr.attrs.get_str("value").map(|s| s.to_string()).or_else(|| expr.attrs.get_int("value").map(|i| i.to_string())),
        _ => None,
    }
}

struct LoopContext {
    header: CfgBlock,
    bound_expr: Option<String>,
}

/// Per-function BFS nesting level over CFG edges, starting at the entry
/// block. `TRUE_BRANCH` edges into another `LOOP_HEADER` increment the
/// level. Visited-set tracking guarantees termination on cyclic CFGs.
fn compute_nesting_levels(blocks: &[CfgBlock], edges: &[CfgEdge], entry_id: &str) -> HashMap<String, u32> {
    let kind_by_id: HashMap<&str, BlockKind> = blocks.iter().map(|b| (b.id.as_str(), b.kind)).collect();
    let mut adjacency: HashMap<&str, Vec<&CfgEdge>> = HashMap::new();
    for e in edges {
        adjacency.entry(e.source_block_id.as_str()).or_default().push(e);
    }

    let mut levels: HashMap<String, u32> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
    queue.push_back((entry_id, 0));
    visited.insert(entry_id);

    while let Some((block_id, level)) = queue.pop_front() {
        if let Some(BlockKind::LoopHeader) = kind_by_id.get(block_id) {
            levels.insert(block_id.to_string(), level);
        }
        if let Some(out_edges) = adjacency.get(block_id) {
            for edge in out_edges {
                let target = edge.target_block_id.as_str();
                if visited.contains(target) {
                    continue;
                }
                visited.insert(target);
                let next_level = if edge.kind == CfgEdgeKind::TrueBranch && kind_by_id.get(target) == Some(&BlockKind::LoopHeader) {
                    level + 1
                } else {
                    level
                };
                queue.push_back((target, next_level));
            }
        }
    }
    levels
}

pub struct CostAnalyzer {
    cache: RwLock<HashMap<(String, String), CostResult>>,
    max_nesting_threshold: u32,
}

impl CostAnalyzer {
    pub fn new(max_nesting_threshold: u32) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            max_nesting_threshold,
        }
    }

    /// Returns `1` (and evicts the cache entry) if a cached result existed.
    pub fn invalidate_cache(&self, function_fqn: &str) -> usize {
        let mut cache = self.cache.write().unwrap();
        let before = cache.len();
        cache.retain(|(fqn, _), _| fqn != function_fqn);
        before - cache.len()
    }

    pub fn analyze(
        &self,
        function_fqn: &str,
        snapshot_id: &str,
        cfg_blocks: &[CfgBlock],
        cfg_edges: &[CfgEdge],
        expressions: &[Expression],
    ) -> CoreResult<CostResult> {
        let cache_key = (function_fqn.to_string(), snapshot_id.to_string());
        if let Some(cached) = self.cache.read().unwrap().get(&cache_key) {
            return Ok(cached.clone());
        }

        let function_blocks: Vec<CfgBlock> = cfg_blocks.iter().filter(|b| b.function_node_id == function_fqn).cloned().collect();
        if function_blocks.is_empty() {
            return Err(CoreError::not_found(format!("CFG blocks not found for function {function_fqn}")));
        }
        let function_exprs: Vec<&Expression> = expressions.iter().filter(|e| e.function_fqn.as_deref() == Some(function_fqn)).collect();
        if function_exprs.is_empty() {
            return Err(CoreError::not_found(format!("Expression IR not found for function {function_fqn}")));
        }

        let entry = function_blocks
            .iter()
            .find(|b| b.kind == BlockKind::Entry)
            .ok_or_else(|| CoreError::not_found(format!("entry block not found for function {function_fqn}")))?;

        let function_edges: Vec<CfgEdge> = cfg_edges
            .iter()
            .filter(|e| function_blocks.iter().any(|b| b.id == e.source_block_id))
            .cloned()
            .collect();

        let nesting_levels = compute_nesting_levels(&function_blocks, &function_edges, &entry.id);

        let loop_headers: Vec<&CfgBlock> = function_blocks.iter().filter(|b| b.kind == BlockKind::LoopHeader).collect();

        let mut loop_contexts = Vec::new();
        for header in &loop_headers {
            let range_call = function_exprs
                .iter()
                .find(|e| header.span.contains_line(e.span.start_line) && e.kind == ExprKind::Call && e.callee_name() == Some("range"));

            let bound_expr = match range_call {
                Some(call) => {
                    let arg_ids = call.arg_expr_ids();
                    let arg_strs: Vec<String> = arg_ids
                        .iter()
                        .filter_map(|id| function_exprs.iter().find(|e| &e.id == id))
                        .filter_map(|e| resolve_bound_expr(Some(e)))
                        .collect();
                    extract_range_bound(&arg_strs)
                }
                None => None,
            };

            loop_contexts.push(LoopContext { header: (*header).clone(), bound_expr });
        }

        let mut loop_bounds = Vec::new();
        let mut hotspots = Vec::new();
        let mut any_heuristic = false;
        let mut max_level = 0u32;

        for ctx in &loop_contexts {
            let level = *nesting_levels.get(&ctx.header.id).unwrap_or(&0);
            max_level = max_level.max(level);
            let bound = match &ctx.bound_expr {
                Some(b) => BoundResult::new(b.clone(), Verdict::Proven, 1.0, InferenceMethod::Pattern, ctx.header.id.clone(), None)
                    .map_err(CoreError::validation)?,
                None => {
                    any_heuristic = true;
                    BoundResult::new("?", Verdict::Heuristic, 0.3, InferenceMethod::Pattern, ctx.header.id.clone(), Some("O(n^2)".into()))
                        .map_err(CoreError::validation)?
                }
            };
            hotspots.push(Hotspot {
                loop_id: ctx.header.id.clone(),
                nesting_level: level,
                bound: bound.bound.clone(),
            });
            loop_bounds.push(bound);
        }

        let factor_count = (max_level as usize) + if loop_contexts.is_empty() { 0 } else { 1 };
        let complexity = if max_level + 1 >= self.max_nesting_threshold && !loop_contexts.is_empty() {
            ComplexityClass::Exponential
        } else {
            ComplexityClass::from_factor_count(factor_count)
        };

        // Sequential loops (siblings at the same nesting level) add; a loop
        // nested inside another multiplies the outer bound. Group hotspots by
        // level, join bounds within a level with "+", then join the per-level
        // terms with "*" from outermost to innermost.
        let cost_term = if hotspots.is_empty() {
            "1".to_string()
        } else {
            let mut by_level: HashMap<u32, Vec<String>> = HashMap::new();
            for h in &hotspots {
                by_level.entry(h.nesting_level).or_default().push(h.bound.clone());
            }
            let mut levels: Vec<u32> = by_level.keys().copied().collect();
            levels.sort_unstable();
            levels
                .into_iter()
                .map(|level| by_level.remove(&level).unwrap().join(" + "))
                .map(|term| if term.contains('+') { format!("({term})") } else { term })
                .collect::<Vec<_>>()
                .join(" * ")
        };

        let verdict = if loop_bounds.iter().all(|b| b.verdict == Verdict::Proven) {
            Verdict::Proven
        } else if any_heuristic {
            Verdict::Heuristic
        } else {
            Verdict::Likely
        };

        let confidence = if loop_bounds.is_empty() {
            1.0
        } else {
            loop_bounds.iter().map(|b| b.confidence).fold(1.0, f64::min)
        };

        let result = CostResult {
            function_name: function_fqn.to_string(),
            complexity,
            cost_term,
            verdict,
            confidence,
            loop_bounds,
            hotspots,
        };

        self.cache.write().unwrap().insert(cache_key, result.clone());
        Ok(result)
    }

    /// §4.12 step 8 / §6.3: same analysis as [`Self::analyze`], wrapped in a
    /// [`ResultEnvelope`] carrying one `Claim` per loop bound and a single
    /// `COST_TERM` `Evidence` entry with the combined cost term and the
    /// per-loop bounds behind it.
    pub fn analyze_envelope(
        &self,
        request_id: &str,
        function_fqn: &str,
        snapshot_id: &str,
        cfg_blocks: &[CfgBlock],
        cfg_edges: &[CfgEdge],
        expressions: &[Expression],
    ) -> CoreResult<ResultEnvelope> {
        let result = self.analyze(function_fqn, snapshot_id, cfg_blocks, cfg_edges, expressions)?;

        let claims: Vec<Claim> = result
            .loop_bounds
            .iter()
            .map(|bound| Claim {
                id: format!("claim:{}:{}", function_fqn, bound.loop_id),
                claim_type: "cost_bound".to_string(),
                confidence_basis: match bound.verdict {
                    Verdict::Proven => ConfidenceBasis::Proven,
                    Verdict::Likely => ConfidenceBasis::Inferred,
                    Verdict::Heuristic => ConfidenceBasis::Heuristic,
                },
                severity: if result.is_slow() { Severity::High } else { Severity::Info },
                subject: function_fqn.to_string(),
                description: format!("loop {} bound inferred as {}", bound.loop_id, bound.bound),
            })
            .collect();

        let evidence = Evidence {
            kind: "COST_TERM".to_string(),
            content: serde_json::json!({
                "cost_term": result.cost_term,
                "loop_bounds": result.loop_bounds,
            }),
            provenance: Provenance { engine: "CostAnalyzer".to_string(), version: env!("CARGO_PKG_VERSION").to_string(), model: None },
            claim_ids: claims.iter().map(|c| c.id.clone()).collect(),
        };

        let summary = format!("{function_fqn}: {} ({:?})", result.cost_term, result.complexity);
        let envelope = claims.into_iter().fold(ResultEnvelope::new(request_id, summary).with_evidence(evidence), |env, claim| env.with_claim(claim));
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Span;

    fn make_literal(id: &str, fqn: &str, value: &str) -> Expression {
        let mut e = Expression::new(id, ExprKind::Literal, "repo1", "f.py", Span::zero());
        e.function_fqn = Some(fqn.to_string());
        e.attrs.set("value", value);
        e
    }

    fn make_name_load(id: &str, fqn: &str, var: &str, line: u32) -> Expression {
        let mut e = Expression::new(id, ExprKind::NameLoad, "repo1", "f.py", Span::new(line, 0, line, 1));
        e.function_fqn = Some(fqn.to_string());
        e.attrs.set("var_name", var);
        e
    }

    fn make_range_call(id: &str, fqn: &str, line: u32, arg_ids: Vec<&str>) -> Expression {
        let mut e = Expression::new(id, ExprKind::Call, "repo1", "f.py", Span::new(line, 0, line, 10));
        e.function_fqn = Some(fqn.to_string());
        e.attrs.set("callee_name", "range");
        let list: Vec<crate::shared::models::AttrValue> = arg_ids.into_iter().map(|s| s.into()).collect();
        e.attrs.0.insert("arg_expr_ids".into(), crate::shared::models::AttrValue::List(list));
        e
    }

    #[test]
    fn extract_range_bound_uses_second_arg_for_three_args() {
        let args = vec!["1".to_string(), "100".to_string(), "2".to_string()];
        assert_eq!(extract_range_bound(&args), Some("100".to_string()));
    }

    #[test]
    fn extract_range_bound_single_arg_is_stop() {
        let args = vec!["n".to_string()];
        assert_eq!(extract_range_bound(&args), Some("n".to_string()));
    }

    #[test]
    fn simple_loop_is_linear_proven() {
        let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::new(0, 0, 0, 0), statement_count: 0 };
        let header = CfgBlock { id: "b1".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 3, 0), statement_count: 1 };
        let exit = CfgBlock { id: "b2".into(), kind: BlockKind::Exit, function_node_id: "f".into(), span: Span::new(4, 0, 4, 0), statement_count: 0 };
        let blocks = vec![entry.clone(), header, exit];
        let edges = vec![
            CfgEdge { source_block_id: "b0".into(), target_block_id: "b1".into(), kind: CfgEdgeKind::Normal },
            CfgEdge { source_block_id: "b1".into(), target_block_id: "b2".into(), kind: CfgEdgeKind::Normal },
        ];
        let n_expr = make_name_load("e1", "f", "n", 1);
        let call_expr = make_range_call("e2", "f", 1, vec!["e1"]);
        let exprs = vec![n_expr, call_expr];

        let analyzer = CostAnalyzer::new(10);
        let result = analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();
        assert_eq!(result.complexity, ComplexityClass::Linear);
        assert_eq!(result.verdict, Verdict::Proven);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.loop_bounds.len(), 1);
        assert_eq!(result.loop_bounds[0].bound, "n");
        assert!(!result.is_slow());
    }

    #[test]
    fn sequential_loops_add_nested_loops_multiply() {
        // Two loops in sequence at the same level: n + m.
        let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 };
        let first = CfgBlock { id: "b1".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 2, 0), statement_count: 1 };
        let second = CfgBlock { id: "b2".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(3, 0, 4, 0), statement_count: 1 };
        let exit = CfgBlock { id: "b3".into(), kind: BlockKind::Exit, function_node_id: "f".into(), span: Span::new(5, 0, 5, 0), statement_count: 0 };
        let blocks = vec![entry, first, second, exit];
        let edges = vec![
            CfgEdge { source_block_id: "b0".into(), target_block_id: "b1".into(), kind: CfgEdgeKind::Normal },
            CfgEdge { source_block_id: "b1".into(), target_block_id: "b2".into(), kind: CfgEdgeKind::Normal },
            CfgEdge { source_block_id: "b2".into(), target_block_id: "b3".into(), kind: CfgEdgeKind::Normal },
        ];
        let exprs = vec![make_name_load("e1", "f", "n", 1), make_range_call("e2", "f", 1, vec!["e1"]), make_name_load("e3", "f", "m", 3), make_range_call("e4", "f", 3, vec!["e3"])];

        let analyzer = CostAnalyzer::new(10);
        let result = analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();
        assert_eq!(result.cost_term, "n + m");

        // Nested: outer TrueBranch into inner LoopHeader, bound n * m.
        let entry2 = CfgBlock { id: "c0".into(), kind: BlockKind::Entry, function_node_id: "g".into(), span: Span::zero(), statement_count: 0 };
        let outer = CfgBlock { id: "outer".into(), kind: BlockKind::LoopHeader, function_node_id: "g".into(), span: Span::new(1, 0, 2, 0), statement_count: 1 };
        let inner = CfgBlock { id: "inner".into(), kind: BlockKind::LoopHeader, function_node_id: "g".into(), span: Span::new(3, 0, 4, 0), statement_count: 1 };
        let blocks2 = vec![entry2, outer, inner];
        let edges2 = vec![
            CfgEdge { source_block_id: "c0".into(), target_block_id: "outer".into(), kind: CfgEdgeKind::Normal },
            CfgEdge { source_block_id: "outer".into(), target_block_id: "inner".into(), kind: CfgEdgeKind::TrueBranch },
        ];
        let exprs2 = vec![make_name_load("f1", "g", "n", 1), make_range_call("f2", "g", 1, vec!["f1"]), make_name_load("f3", "g", "m", 3), make_range_call("f4", "g", 3, vec!["f3"])];
        let result2 = analyzer.analyze("g", "snap1", &blocks2, &edges2, &exprs2).unwrap();
        assert_eq!(result2.cost_term, "n * m");
    }

    #[test]
    fn cache_hit_returns_same_and_invalidate_recomputes() {
        let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 };
        let header = CfgBlock { id: "b1".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 3, 0), statement_count: 1 };
        let blocks = vec![entry, header];
        let edges = vec![CfgEdge { source_block_id: "b0".into(), target_block_id: "b1".into(), kind: CfgEdgeKind::Normal }];
        let n_expr = make_name_load("e1", "f", "n", 1);
        let call_expr = make_range_call("e2", "f", 1, vec!["e1"]);
        let exprs = vec![n_expr, call_expr];

        let analyzer = CostAnalyzer::new(10);
        let r1 = analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();
        let r2 = analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();
        assert_eq!(r1.cost_term, r2.cost_term);
        assert_eq!(analyzer.invalidate_cache("f"), 1);
        assert_eq!(analyzer.invalidate_cache("f"), 0);
    }

    #[test]
    fn analyze_envelope_carries_a_cost_term_evidence_entry() {
        let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 };
        let header = CfgBlock { id: "b1".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 3, 0), statement_count: 1 };
        let blocks = vec![entry, header];
        let edges = vec![CfgEdge { source_block_id: "b0".into(), target_block_id: "b1".into(), kind: CfgEdgeKind::Normal }];
        let n_expr = make_name_load("e1", "f", "n", 1);
        let call_expr = make_range_call("e2", "f", 1, vec!["e1"]);
        let exprs = vec![n_expr, call_expr];

        let analyzer = CostAnalyzer::new(10);
        let envelope = analyzer.analyze_envelope("req1", "f", "snap1", &blocks, &edges, &exprs).unwrap();

        assert_eq!(envelope.request_id, "req1");
        assert_eq!(envelope.claims.len(), 1);
        assert_eq!(envelope.evidences.len(), 1);
        assert_eq!(envelope.evidences[0].kind, "COST_TERM");
        assert_eq!(envelope.evidences[0].provenance.engine, "CostAnalyzer");
        assert_eq!(envelope.evidences[0].claim_ids, vec![envelope.claims[0].id.clone()]);
        assert_eq!(envelope.evidences[0].content["cost_term"], "n");
    }

    #[test]
    fn missing_cfg_is_hard_error() {
        let analyzer = CostAnalyzer::new(10);
        let err = analyzer.analyze("missing_fn", "snap1", &[], &[], &[]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}

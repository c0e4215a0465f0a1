//! Six end-to-end scenarios pinned against realistic fixtures, one per
//! module boundary this crate exposes.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use codegraph_core::features::cost_analysis::{ComplexityClass, CostAnalyzer, Verdict};
use codegraph_core::features::cross_file::{CrossFileResolver, FileUnit};
use codegraph_core::features::lexical::fusion_engine::{ChunkMetadata, FusionEngine, QueryExpansions};
use codegraph_core::features::lexical::models::{IntentProbability, RankedHit};
use codegraph_core::features::taint_analysis::domain::{
    AtomKind, CompiledRule, DetectedSink, DetectedSource, Effect, GeneratorKind, Predicate, Severity, TaintFlow, Vulnerability,
};
use codegraph_core::features::taint_analysis::{Entity, TaintRuleExecutor};
use codegraph_core::shared::models::{
    AttrValue, BlockKind, CfgBlock, CfgEdge, CfgEdgeKind, ExprKind, Expression, Node, NodeKind, Span,
};

fn name_load(id: &str, fqn: &str, var: &str, line: u32) -> Expression {
    let mut e = Expression::new(id, ExprKind::NameLoad, "repo1", "f.py", Span::new(line, 0, line, 1));
    e.function_fqn = Some(fqn.to_string());
    e.attrs.set("var_name", var);
    e
}

fn range_call(id: &str, fqn: &str, line: u32, arg_ids: Vec<&str>) -> Expression {
    let mut e = Expression::new(id, ExprKind::Call, "repo1", "f.py", Span::new(line, 0, line, 10));
    e.function_fqn = Some(fqn.to_string());
    e.attrs.set("callee_name", "range");
    let list: Vec<AttrValue> = arg_ids.into_iter().map(|s| s.into()).collect();
    e.attrs.0.insert("arg_expr_ids".into(), AttrValue::List(list));
    e
}

#[test]
fn scenario_1_simple_loop_is_linear_proven() {
    let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 };
    let header =
        CfgBlock { id: "b1".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 3, 0), statement_count: 1 };
    let exit = CfgBlock { id: "b2".into(), kind: BlockKind::Exit, function_node_id: "f".into(), span: Span::new(4, 0, 4, 0), statement_count: 0 };
    let blocks = vec![entry, header, exit];
    let edges = vec![
        CfgEdge { source_block_id: "b0".into(), target_block_id: "b1".into(), kind: CfgEdgeKind::Normal },
        CfgEdge { source_block_id: "b1".into(), target_block_id: "b2".into(), kind: CfgEdgeKind::Normal },
    ];
    let exprs = vec![name_load("e1", "f", "n", 1), range_call("e2", "f", 1, vec!["e1"])];

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
fn scenario_2_nested_loops_are_quadratic() {
    let entry = CfgBlock { id: "b0".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 };
    let outer =
        CfgBlock { id: "outer".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(1, 0, 2, 0), statement_count: 1 };
    let inner =
        CfgBlock { id: "inner".into(), kind: BlockKind::LoopHeader, function_node_id: "f".into(), span: Span::new(3, 0, 8, 0), statement_count: 1 };
    let body = CfgBlock { id: "body".into(), kind: BlockKind::Block, function_node_id: "f".into(), span: Span::new(5, 0, 6, 0), statement_count: 1 };
    let exit = CfgBlock { id: "exit".into(), kind: BlockKind::Exit, function_node_id: "f".into(), span: Span::new(9, 0, 9, 0), statement_count: 0 };
    let blocks = vec![entry, outer, inner, body, exit];

    let edges = vec![
        CfgEdge { source_block_id: "b0".into(), target_block_id: "outer".into(), kind: CfgEdgeKind::Normal },
        CfgEdge { source_block_id: "outer".into(), target_block_id: "inner".into(), kind: CfgEdgeKind::TrueBranch },
        CfgEdge { source_block_id: "inner".into(), target_block_id: "body".into(), kind: CfgEdgeKind::Normal },
        CfgEdge { source_block_id: "body".into(), target_block_id: "outer".into(), kind: CfgEdgeKind::LoopBack },
        CfgEdge { source_block_id: "outer".into(), target_block_id: "exit".into(), kind: CfgEdgeKind::Normal },
    ];

    let exprs = vec![
        name_load("n_expr", "f", "n", 1),
        range_call("n_call", "f", 1, vec!["n_expr"]),
        name_load("m_expr", "f", "m", 3),
        range_call("m_call", "f", 3, vec!["m_expr"]),
    ];

    let analyzer = CostAnalyzer::new(10);
    let result = analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();

    assert_eq!(result.complexity, ComplexityClass::Quadratic);
    assert_eq!(result.verdict, Verdict::Proven);
    let bounds: Vec<&str> = result.loop_bounds.iter().map(|b| b.bound.as_str()).collect();
    assert!(bounds.contains(&"n"));
    assert!(bounds.contains(&"m"));
    assert!(result.is_slow());
}

#[test]
fn scenario_3_sql_injection_flow_is_critical_cwe_89() {
    let source = DetectedSource { atom_id: "input.http.flask".into(), file_path: "app.py".into(), line: 10, tags: vec!["untrusted".into()] };
    let sink = DetectedSink { atom_id: "sink.sql.sqlite3".into(), file_path: "app.py".into(), line: 20, matched_arg_indices: vec![0] };
    let flow = TaintFlow::new(vec!["var_1".into(), "var_2".into(), "expr_1".into()], false, 0.95);
    assert_eq!(flow.length(), 3);

    let vuln = Vulnerability {
        id: Uuid::new_v4(),
        policy_id: "sql-injection".into(),
        policy_name: "SQL Injection".into(),
        severity: Severity::Critical,
        source,
        sink,
        flow,
        confidence: 0.95,
        cwe: Some("CWE-89".into()),
        timestamp: Utc::now(),
    };

    assert_eq!(vuln.severity, Severity::Critical);
    assert_eq!(vuln.confidence, 0.95);
    assert_eq!(vuln.cwe.as_deref(), Some("CWE-89"));
    assert!(vuln.cwe_is_valid());
    assert_eq!(vuln.get_file_path(), "app.py");
    assert_eq!(vuln.get_line(), 10);
}

fn os_system_rule() -> CompiledRule {
    CompiledRule {
        rule_id: "sink.command-injection.os-system".into(),
        atom_id: "sink.os.system".into(),
        specificity_score: 100.0,
        tier: 0,
        generators: vec![GeneratorKind::ExactCall { call: "os.system".into() }],
        prefilters: vec![],
        predicates: vec![Predicate { name: "arg_is_tainted(0)".into(), confidence_adjustment: 0.0 }],
        confidence_base: 0.9,
        report_threshold: 0.5,
        effect: Effect { kind: AtomKind::Sink, taint_arg_positions: vec![0], vulnerability_policy_id: Some("cmd-injection".into()) },
    }
}

#[test]
fn scenario_4_command_injection_match_caches_on_rerun() {
    let user_host = "$HOST".to_string();
    let entity = Entity::new("e1", "call").with_call("os.system").with_args(vec![format!("ping -c 4 {user_host}")]).with_tainted(vec![0]);
    let executor = TaintRuleExecutor::new(vec![os_system_rule()], true, 100);

    let (matches1, stats1) = executor.execute(&[entity.clone()], 100_000, true);
    assert_eq!(matches1.len(), 1);
    assert_eq!(matches1[0].rule_id, "sink.command-injection.os-system");
    assert_eq!(matches1[0].taint_positions, vec![0]);
    assert!(matches1[0].trace.is_some());
    assert_eq!(stats1.cache_misses, 1);

    let (matches2, stats2) = executor.execute(&[entity], 100_000, true);
    assert_eq!(matches2[0].rule_id, matches1[0].rule_id);
    assert_eq!(stats2.cache_hits, 1);
}

#[test]
fn scenario_5_cross_file_import_resolves_and_orders_topologically() {
    let calc_node = Node::new("node:r:class:calculator", NodeKind::Class, "Calculator", "file1.py").with_span(Span::zero());
    let calc_id = calc_node.id.clone();
    let unit1 = FileUnit { file_path: "file1.py".into(), nodes: vec![calc_node], imports: vec![] };
    let unit2 = FileUnit { file_path: "file2.py".into(), nodes: vec![], imports: vec![("edge:import:1".into(), "Calculator".into())] };

    let mut resolver = CrossFileResolver::new();
    resolver.build_symbol_table(&[unit1, unit2.clone()]);
    let resolved = resolver.resolve_imports(&[unit2]);

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].resolved_file.as_deref(), Some("file1.py"));
    assert_eq!(resolved[0].resolved_node_id.as_deref(), Some(calc_id.as_str()));
    assert!(resolver.dependencies["file2.py"].contains("file1.py"));

    let order = resolver.topological_order();
    let pos1 = order.iter().position(|f| f == "file1.py").unwrap();
    let pos2 = order.iter().position(|f| f == "file2.py").unwrap();
    assert!(pos1 < pos2);
}

fn hit(chunk_id: &str, file_path: &str, rank: usize) -> RankedHit {
    RankedHit { chunk_id: chunk_id.into(), file_path: file_path.into(), symbol_id: None, rank, metadata: HashMap::new() }
}

#[test]
fn scenario_6_retrieval_fusion_with_flow_intent_boosts_graph_consensus() {
    let mut hits: HashMap<String, Vec<RankedHit>> = HashMap::new();
    hits.insert("vector".to_string(), vec![hit("A", "a.rs", 1), hit("B", "b.rs", 2)]);
    hits.insert("lexical".to_string(), vec![hit("B", "b.rs", 1), hit("C", "c.rs", 2)]);
    hits.insert("graph".to_string(), vec![hit("A", "a.rs", 1), hit("C", "c.rs", 2)]);

    let intent = IntentProbability { flow: 0.6, symbol: 0.1, concept: 0.1, code: 0.1, balanced: 0.1 };
    assert_eq!(intent.dominant_intent(), "flow");

    let engine = FusionEngine::new(60.0);
    let metadata: HashMap<String, ChunkMetadata> = HashMap::new();
    let expansions = QueryExpansions::default();
    let results = engine.fuse(hits, intent, &metadata, Some(&expansions), true);

    let a = results.iter().find(|r| r.chunk_id == "A").unwrap();
    let c = results.iter().find(|r| r.chunk_id == "C").unwrap();
    assert!(a.feature_vector.num_strategies >= 2);
    assert!(c.feature_vector.num_strategies >= 2);
    assert_eq!(results[0].chunk_id, "A");
    assert!(a.explanation.as_ref().unwrap().contains("Intent: flow (0.60)"));
}

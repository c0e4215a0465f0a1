use codegraph_core::features::cost_analysis::CostAnalyzer;
use codegraph_core::shared::models::{BlockKind, CfgBlock, CfgEdge, CfgEdgeKind, ExprKind, Expression, Span};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn nested_loop_cfg(depth: usize) -> (Vec<CfgBlock>, Vec<CfgEdge>, Vec<Expression>) {
    let mut blocks = vec![CfgBlock { id: "entry".into(), kind: BlockKind::Entry, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 }];
    let mut edges = Vec::new();
    let mut exprs = Vec::new();
    let mut prev = "entry".to_string();

    for level in 0..depth {
        let header_id = format!("loop{level}");
        blocks.push(CfgBlock {
            id: header_id.clone(),
            kind: BlockKind::LoopHeader,
            function_node_id: "f".into(),
            span: Span::new(level as u32, 0, level as u32 + 1, 0),
            statement_count: 1,
        });
        edges.push(CfgEdge { source_block_id: prev.clone(), target_block_id: header_id.clone(), kind: CfgEdgeKind::TrueBranch });

        let name_id = format!("n{level}");
        let mut n_expr = Expression::new(&name_id, ExprKind::NameLoad, "repo1", "f.py", Span::new(level as u32, 0, level as u32, 1));
        n_expr.function_fqn = Some("f".to_string());
        n_expr.attrs.set("var_name", "n");
        exprs.push(n_expr);

        let call_id = format!("call{level}");
        let mut call_expr = Expression::new(&call_id, ExprKind::Call, "repo1", "f.py", Span::new(level as u32, 0, level as u32, 10));
        call_expr.function_fqn = Some("f".to_string());
        call_expr.attrs.set("callee_name", "range");
        let arg_list = vec![codegraph_core::shared::models::AttrValue::Str(name_id)];
        call_expr.attrs.0.insert("arg_expr_ids".into(), codegraph_core::shared::models::AttrValue::List(arg_list));
        exprs.push(call_expr);

        prev = header_id;
    }
    blocks.push(CfgBlock { id: "exit".into(), kind: BlockKind::Exit, function_node_id: "f".into(), span: Span::zero(), statement_count: 0 });
    edges.push(CfgEdge { source_block_id: prev, target_block_id: "exit".into(), kind: CfgEdgeKind::Normal });

    (blocks, edges, exprs)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_analyzer_analyze");
    for depth in [1usize, 3, 6] {
        let (blocks, edges, exprs) = nested_loop_cfg(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let analyzer = CostAnalyzer::new(10);
                black_box(analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let (blocks, edges, exprs) = nested_loop_cfg(3);
    let analyzer = CostAnalyzer::new(10);
    analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap();

    c.bench_function("cost_analyzer_cache_hit", |b| {
        b.iter(|| black_box(analyzer.analyze("f", "snap1", &blocks, &edges, &exprs).unwrap()));
    });
}

criterion_group!(benches, bench_analyze, bench_cache_hit);
criterion_main!(benches);

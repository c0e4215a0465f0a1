//! Collection data-flow builder (§4.8): recognizes collection store/load
//! method calls and for-loop iteration, and emits the heap-sensitive
//! `COLLECTION_STORE`/`COLLECTION_LOAD` edges the interprocedural taint
//! analyzer walks. Ported from the original `collection_builder.py`
//! (`COLLECTION_STORE_METHODS`/`COLLECTION_LOAD_METHODS` tables and the
//! `obj.method()` call-pattern detection), adapted to read from the
//! `Edge`/`Expression` shapes this crate's language adapter already emits
//! instead of re-walking source text.

use std::collections::HashMap;

use crate::shared::models::{Edge, EdgeKind, ExprKind, Expression, IdfgEdgeKind, InterproceduralDataFlowEdge};

struct StoreMethod {
    arg_index: usize,
    is_iterable: bool,
}

fn store_methods() -> HashMap<&'static str, StoreMethod> {
    [
        ("append", StoreMethod { arg_index: 0, is_iterable: false }),
        ("extend", StoreMethod { arg_index: 0, is_iterable: true }),
        ("insert", StoreMethod { arg_index: 1, is_iterable: false }),
        ("add", StoreMethod { arg_index: 0, is_iterable: false }),
        ("update", StoreMethod { arg_index: 0, is_iterable: true }),
        ("__setitem__", StoreMethod { arg_index: 1, is_iterable: false }),
        ("setdefault", StoreMethod { arg_index: 1, is_iterable: false }),
        ("put", StoreMethod { arg_index: 0, is_iterable: false }),
        ("appendleft", StoreMethod { arg_index: 0, is_iterable: false }),
    ]
    .into_iter()
    .collect()
}

fn load_methods() -> &'static [&'static str] {
    &["__getitem__", "get", "pop", "values", "items", "popleft"]
}

/// `element_key`-level identity for a collection's abstract elements.
/// Every store/load through one variable aliases this one key — the
/// heap-sensitive layer does not track individual indices.
fn element_id(collection_var_id: &str) -> String {
    format!("{collection_var_id}[*]")
}

/// Builds `COLLECTION_STORE`/`COLLECTION_LOAD` edges from the CALLS edges a
/// language adapter tagged with `receiver_var_id`/`method_name`, plus
/// `FOR_LOOP` expressions for iteration edges.
///
/// `call_args[store.arg_index] == "<call>"` is the adapter's placeholder for
/// a nested call expression used as an argument; it's resolved to that
/// call's own result by matching the enclosing call's source line against
/// `expressions`, mirroring the original's `call_vars_by_line` index.
pub fn build_collection_edges(repo_id: &str, calls: &[&Edge], expressions: &[Expression]) -> Vec<InterproceduralDataFlowEdge> {
    let stores = store_methods();
    let loads = load_methods();
    let call_result_by_line: HashMap<u32, String> = expressions
        .iter()
        .filter(|e| e.kind == ExprKind::Call)
        .map(|e| (e.span.start_line, e.id.clone()))
        .collect();

    let mut edges = Vec::new();
    let mut counter: u64 = 0;
    let mut next_id = |repo_id: &str, counter: &mut u64| {
        let id = format!("idfg:{repo_id}:{counter}");
        *counter += 1;
        id
    };

    for call in calls {
        if call.kind != EdgeKind::Calls {
            continue;
        }
        let Some(receiver_id) = call.attrs.get_str("receiver_var_id") else { continue };
        let Some(method) = call.attrs.get_str("method_name") else { continue };
        let collection_el = element_id(receiver_id);
        let line = call.span.map(|s| s.start_line).unwrap_or(0);

        if let Some(store) = stores.get(method) {
            let args = call.attrs.get_list("call_args").unwrap_or(&[]);
            let value = args.get(store.arg_index).and_then(|v| match v {
                crate::shared::models::AttrValue::Str(s) => Some(s.clone()),
                _ => None,
            });
            let resolved = match value.as_deref() {
                Some("<call>") => call_result_by_line.get(&line).cloned(),
                Some(v) => Some(v.to_string()),
                None => None,
            };
            if let Some(from_var) = resolved {
                edges.push(InterproceduralDataFlowEdge {
                    id: next_id(repo_id, &mut counter),
                    kind: IdfgEdgeKind::CollectionStore,
                    from_var_id: from_var,
                    to_var_id: collection_el.clone(),
                    call_site_id: None,
                    caller_fqn: None,
                    callee_fqn: None,
                    arg_position: Some(store.arg_index as u32),
                    collection_var_id: Some(receiver_id.to_string()),
                    element_key: if store.is_iterable { Some("*".to_string()) } else { None },
                });
            }
        } else if loads.contains(&method) {
            if let Some(result_var) = call.attrs.get_str("result_var") {
                edges.push(InterproceduralDataFlowEdge {
                    id: next_id(repo_id, &mut counter),
                    kind: IdfgEdgeKind::CollectionLoad,
                    from_var_id: collection_el.clone(),
                    to_var_id: result_var.to_string(),
                    call_site_id: None,
                    caller_fqn: None,
                    callee_fqn: None,
                    arg_position: None,
                    collection_var_id: Some(receiver_id.to_string()),
                    element_key: None,
                });
            }
        }
    }

    for expr in expressions {
        if expr.kind != ExprKind::ForLoop {
            continue;
        }
        let (Some(iterator_var), Some(iterable)) = (expr.defines_var.clone(), expr.reads_vars.first().cloned()) else { continue };
        edges.push(InterproceduralDataFlowEdge {
            id: next_id(repo_id, &mut counter),
            kind: IdfgEdgeKind::CollectionLoad,
            from_var_id: element_id(&iterable),
            to_var_id: iterator_var,
            call_site_id: None,
            caller_fqn: expr.function_fqn.clone(),
            callee_fqn: None,
            arg_position: None,
            collection_var_id: Some(iterable),
            element_key: None,
        });
    }

    edges
}

//! Per-file language adapter: walks a [`SyntaxTree`] and emits the
//! syntactic IR layer (§3.3) a [`crate::shared::models::IrDocument`] starts
//! from. Grounded on the original call analyzer's scope-stack/FQN-building
//! style and its external-function-stub cache.

use std::collections::HashMap;

use crate::ports::syntax_tree::{AstNode, SyntaxTree};
use crate::shared::models::{
    AttrValue, Edge, EdgeKind, Expression, ExpressionIdCounter, ExprKind, Node, NodeKind, Occurrence, OccurrenceGenerator, Span,
    SymbolRole, SymbolRoles,
};
use crate::shared::utils::id_strategy::IdStrategy;

use super::builtins::external_fqn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Module,
    Class,
    Function,
}

#[derive(Debug, Clone)]
struct ScopeFrame {
    kind: ScopeKind,
    name: String,
    node_id: String,
}

/// Everything one `build_file` call produces for a single source file.
#[derive(Debug, Default)]
pub struct AdapterOutput {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub occurrences: Vec<Occurrence>,
    pub expressions: Vec<Expression>,
}

/// Stateful, per-repo adapter. The external-function cache (§3.3 invariant:
/// one stub node per `(repo_id, canonical_name)`) is meant to outlive a
/// single file and is reused across `build_file` calls on the same repo.
pub struct LanguageAdapter {
    repo_id: String,
    language: String,
    external_functions: HashMap<String, Node>,
    /// `(function_fqn, var_name) -> node_id`, reset per file; a language
    /// adapter does not need cross-file variable resolution (§4.5 handles
    /// that at the cross-file layer).
    variables: HashMap<(String, String), String>,
    edge_counter: u64,
}

fn node_text<'a>(node: &dyn AstNode, source: &'a [u8]) -> &'a str {
    let (start, end) = node.byte_range();
    std::str::from_utf8(source.get(start..end).unwrap_or(&[])).unwrap_or("")
}

impl LanguageAdapter {
    pub fn new(repo_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            language: language.into(),
            external_functions: HashMap::new(),
            variables: HashMap::new(),
            edge_counter: 0,
        }
    }

    pub fn external_function_count(&self) -> usize {
        self.external_functions.len()
    }

    /// Walks `tree` and emits the full syntactic IR for one file.
    ///
    /// `occ_gen`/`expr_ids` are threaded in rather than owned here: a repo
    /// build session shares one monotonic counter pair across every file so
    /// IDs stay unique document-wide, not just file-wide (§4.4's
    /// `clear_caches()` resets that shared pair between sessions, not
    /// between files).
    pub fn build_file(
        &mut self,
        file_path: &str,
        module_path: &str,
        tree: &dyn SyntaxTree,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) -> AdapterOutput {
        self.variables.clear();
        let source = tree.source_bytes();
        let mut out = AdapterOutput::default();

        let root = tree.root_node();
        let file_id = IdStrategy::node_id(&self.repo_id, &self.language, "file", module_path, file_path, "");
        let mut file_node = Node::new(file_id.clone(), NodeKind::File, module_path, file_path).with_language(&self.language);
        file_node.attrs.set("module_path", module_path);
        out.nodes.push(file_node);

        let mut scopes = vec![ScopeFrame { kind: ScopeKind::Module, name: module_path.to_string(), node_id: file_id }];
        self.walk_children(root.as_ref(), source, &mut scopes, &mut out, occ_gen, expr_ids);
        out
    }

    fn current_parent(&self, scopes: &[ScopeFrame]) -> String {
        scopes.last().expect("module scope always present").node_id.clone()
    }

    fn current_fqn_prefix(&self, scopes: &[ScopeFrame]) -> String {
        scopes.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(".")
    }

    fn current_function_fqn(&self, scopes: &[ScopeFrame]) -> Option<String> {
        scopes.iter().rev().find(|f| f.kind == ScopeKind::Function).map(|_| self.current_fqn_prefix(scopes))
    }

    fn next_edge_id(&mut self, kind: EdgeKind, source_id: &str, target_id: &str) -> String {
        let id = IdStrategy::edge_id(&kind.to_string(), source_id, target_id, self.edge_counter);
        self.edge_counter += 1;
        id
    }

    fn contains_edge(&mut self, parent_id: &str, child_id: &str, span: Span, out: &mut AdapterOutput) {
        let id = self.next_edge_id(EdgeKind::Contains, parent_id, child_id);
        out.edges.push(Edge::new(id, EdgeKind::Contains, parent_id, child_id).with_span(span));
    }

    fn walk_children(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        for child in node.children() {
            self.walk_node(child.as_ref(), source, scopes, out, occ_gen, expr_ids);
        }
    }

    fn walk_node(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        match node.kind() {
            "function_definition" => self.handle_function(node, source, scopes, out, occ_gen, expr_ids),
            "class_definition" => self.handle_class(node, source, scopes, out, occ_gen, expr_ids),
            "import_statement" => self.handle_import(node, source, scopes, out, false),
            "import_from_statement" => self.handle_import(node, source, scopes, out, true),
            "call" => {
                self.handle_call(node, source, scopes, out, occ_gen, expr_ids);
            }
            "assignment" => self.handle_assignment(node, source, scopes, out, occ_gen, expr_ids),
            "for_statement" => self.handle_for(node, source, scopes, out, occ_gen, expr_ids),
            "identifier" => self.handle_identifier_read(node, source, scopes, out, occ_gen, expr_ids),
            _ => self.walk_children(node, source, scopes, out, occ_gen, expr_ids),
        }
    }

    fn handle_function(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        let name_node = node.child_by_field_name("name");
        let name = name_node.as_deref().map(|n| node_text(n, source).to_string()).unwrap_or_default();
        if name.is_empty() {
            self.walk_children(node, source, scopes, out, occ_gen, expr_ids);
            return;
        }

        let is_method = scopes.last().map(|f| f.kind == ScopeKind::Class).unwrap_or(false);
        let kind = if is_method { NodeKind::Method } else { NodeKind::Function };
        let fqn = format!("{}.{name}", self.current_fqn_prefix(scopes));
        let file_path = out.nodes[0].file_path.clone();
        let parent_id = self.current_parent(scopes);
        let span = node.span();

        let node_id = IdStrategy::node_id(&self.repo_id, &self.language, &kind.to_string(), &fqn, &file_path, &name);
        let mut fn_node = Node::new(node_id.clone(), kind, fqn.clone(), file_path)
            .with_language(&self.language)
            .with_span(span)
            .with_parent(parent_id.clone());
        if is_method {
            fn_node.attrs.set("is_method", true);
        }
        out.nodes.push(fn_node);
        self.contains_edge(&parent_id, &node_id, span, out);

        scopes.push(ScopeFrame { kind: ScopeKind::Function, name, node_id: node_id.clone() });
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body.as_ref(), source, scopes, out, occ_gen, expr_ids);
        }
        scopes.pop();
    }

    fn handle_class(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        let name_node = node.child_by_field_name("name");
        let name = name_node.as_deref().map(|n| node_text(n, source).to_string()).unwrap_or_default();
        if name.is_empty() {
            self.walk_children(node, source, scopes, out, occ_gen, expr_ids);
            return;
        }

        let fqn = format!("{}.{name}", self.current_fqn_prefix(scopes));
        let file_path = out.nodes[0].file_path.clone();
        let parent_id = self.current_parent(scopes);
        let span = node.span();

        let node_id = IdStrategy::node_id(&self.repo_id, &self.language, "class", &fqn, &file_path, &name);
        let class_node =
            Node::new(node_id.clone(), NodeKind::Class, fqn.clone(), file_path).with_language(&self.language).with_span(span).with_parent(parent_id.clone());
        out.nodes.push(class_node);
        self.contains_edge(&parent_id, &node_id, span, out);

        if let Some(bases) = node.child_by_field_name("superclasses") {
            for base in bases.children() {
                if base.kind() == "identifier" || base.kind() == "attribute" {
                    let base_name = node_text(base.as_ref(), source).to_string();
                    let target = self.resolve_callee(&base_name, scopes);
                    let id = self.next_edge_id(EdgeKind::Inherits, &node_id, &target);
                    out.edges.push(Edge::new(id, EdgeKind::Inherits, node_id.clone(), target).with_span(base.span()));
                }
            }
        }

        scopes.push(ScopeFrame { kind: ScopeKind::Class, name, node_id: node_id.clone() });
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body.as_ref(), source, scopes, out, occ_gen, expr_ids);
        }
        scopes.pop();
    }

    fn handle_import(&mut self, node: &dyn AstNode, source: &[u8], scopes: &mut Vec<ScopeFrame>, out: &mut AdapterOutput, is_from_import: bool) {
        let parent_id = self.current_parent(scopes);
        let file_path = out.nodes[0].file_path.clone();
        let span = node.span();

        let module_name = node.child_by_field_name("module_name").map(|n| node_text(n.as_ref(), source).to_string()).unwrap_or_default();

        let imported_names: Vec<String> = node
            .children()
            .into_iter()
            .filter(|c| matches!(c.kind(), "dotted_name" | "aliased_import" | "identifier"))
            .map(|c| node_text(c.as_ref(), source).to_string())
            .filter(|s| !s.is_empty() && s != &module_name)
            .collect();

        let mut emit_one = |this: &mut Self, fqn: String, name: String, out: &mut AdapterOutput| {
            let node_id = IdStrategy::node_id(&this.repo_id, &this.language, "import", &fqn, &file_path, &name);
            let import_node = Node::new(node_id.clone(), NodeKind::Import, fqn.clone(), file_path.clone())
                .with_language(&this.language)
                .with_name(name)
                .with_span(span)
                .with_parent(parent_id.clone());
            out.nodes.push(import_node);
            let edge_id = this.next_edge_id(EdgeKind::Imports, &parent_id, &fqn);
            out.edges.push(Edge::new(edge_id, EdgeKind::Imports, parent_id.clone(), fqn).with_span(span));
        };

        if is_from_import && !imported_names.is_empty() {
            for name in imported_names {
                let fqn = format!("{module_name}.{name}");
                emit_one(self, fqn, name, out);
            }
        } else {
            let fqn = if module_name.is_empty() { imported_names.first().cloned().unwrap_or_default() } else { module_name };
            let name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();
            if !fqn.is_empty() {
                emit_one(self, fqn, name, out);
            }
        }
    }

    fn handle_assignment(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        let span = node.span();
        let file_path = out.nodes[0].file_path.clone();
        let function_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));

        // The LHS variable is registered before the RHS call is walked so a
        // `result_var` attr can be attached to the CALLS edge the call
        // produces (consumed by the collection-load builder, §4.8).
        let mut lhs_var_id = None;
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "identifier" {
                let var_name = node_text(left.as_ref(), source).to_string();
                let key = (function_fqn.clone(), var_name.clone());
                let var_id = self
                    .variables
                    .entry(key)
                    .or_insert_with(|| IdStrategy::node_id(&self.repo_id, &self.language, "variable", &format!("{function_fqn}.{var_name}"), &file_path, &var_name))
                    .clone();

                if !out.nodes.iter().any(|n| n.id == var_id) {
                    let var_node = Node::new(var_id.clone(), NodeKind::Variable, format!("{function_fqn}.{var_name}"), file_path.clone())
                        .with_language(&self.language)
                        .with_name(var_name)
                        .with_span(span)
                        .with_parent(self.current_parent(scopes));
                    out.nodes.push(var_node);
                }
                lhs_var_id = Some(var_id);
            }
        }

        if let Some(right) = node.child_by_field_name("right") {
            if right.kind() == "call" {
                self.handle_call(right.as_ref(), source, scopes, out, occ_gen, expr_ids);
                if let Some(var_id) = &lhs_var_id {
                    let owner = self.current_parent(scopes);
                    if let Some(edge) = out.edges.iter_mut().rev().find(|e| e.kind == EdgeKind::Calls && e.source_id == owner) {
                        edge.attrs.set("result_var", var_id.as_str());
                    }
                }
            } else {
                self.walk_node(right.as_ref(), source, scopes, out, occ_gen, expr_ids);
            }
        }

        if let Some(var_id) = lhs_var_id {
            let owner = self.current_parent(scopes);
            let edge_id = self.next_edge_id(EdgeKind::Writes, &owner, &var_id);
            out.edges.push(Edge::new(edge_id, EdgeKind::Writes, owner.clone(), var_id.clone()).with_span(span));
            let edge_id = self.next_edge_id(EdgeKind::Defines, &owner, &var_id);
            out.edges.push(Edge::new(edge_id, EdgeKind::Defines, owner, var_id.clone()).with_span(span));

            let expr_id = expr_ids.next(&self.repo_id, &file_path, span.start_line, span.start_col);
            let mut expr = Expression::new(expr_id, ExprKind::Assign, &self.repo_id, &file_path, span);
            expr.function_fqn = Some(function_fqn);
            expr.defines_var = Some(var_id);
            out.expressions.push(expr);
        }
    }

    fn handle_for(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        let span = node.span();
        let file_path = out.nodes[0].file_path.clone();
        let function_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));

        let iterator_var = node.child_by_field_name("left").map(|n| node_text(n.as_ref(), source).to_string());
        let iterable = node.child_by_field_name("right").map(|n| node_text(n.as_ref(), source).to_string());

        if let (Some(iterator_var), Some(iterable)) = (iterator_var.clone(), iterable.clone()) {
            let expr_id = expr_ids.next(&self.repo_id, &file_path, span.start_line, span.start_col);
            let mut expr = Expression::new(expr_id, ExprKind::ForLoop, &self.repo_id, &file_path, span);
            expr.function_fqn = Some(function_fqn.clone());
            expr.reads_vars = vec![iterable.clone()];
            expr.defines_var = Some(iterator_var.clone());
            expr.attrs.set("iterator_var", iterator_var.as_str());
            expr.attrs.set("iterable", iterable.as_str());
            out.expressions.push(expr);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body.as_ref(), source, scopes, out, occ_gen, expr_ids);
        }
    }

    fn handle_identifier_read(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut [ScopeFrame],
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) {
        let name = node_text(node, source).to_string();
        if name.is_empty() {
            return;
        }
        let span = node.span();
        let file_path = out.nodes[0].file_path.clone();
        let function_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));

        let var_id = self.variables.get(&(function_fqn.clone(), name.clone())).cloned();
        if let Some(var_id) = &var_id {
            let owner = self.current_parent(scopes);
            let edge_id = self.next_edge_id(EdgeKind::Reads, &owner, var_id);
            out.edges.push(Edge::new(edge_id, EdgeKind::Reads, owner, var_id.clone()).with_span(span));

            let occ_id = occ_gen.next_id();
            out.occurrences.push(Occurrence::new(occ_id, var_id.clone(), &file_path, span, SymbolRoles::of([SymbolRole::Read])));
        }

        let expr_id = expr_ids.next(&self.repo_id, &file_path, span.start_line, span.start_col);
        let mut expr = Expression::new(expr_id, ExprKind::NameLoad, &self.repo_id, &file_path, span);
        expr.function_fqn = Some(function_fqn);
        expr.attrs.set("var_name", name);
        out.expressions.push(expr);
    }

    fn handle_call(
        &mut self,
        node: &dyn AstNode,
        source: &[u8],
        scopes: &mut Vec<ScopeFrame>,
        out: &mut AdapterOutput,
        occ_gen: &mut OccurrenceGenerator,
        expr_ids: &mut ExpressionIdCounter,
    ) -> String {
        let span = node.span();
        let file_path = out.nodes[0].file_path.clone();
        let function_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));
        let caller_id = self.current_parent(scopes);

        let func_node = node.child_by_field_name("function");
        let callee_name = func_node.as_deref().map(|n| node_text(n, source).to_string()).unwrap_or_default();
        let callee_id = if callee_name.is_empty() { None } else { Some(self.resolve_callee(&callee_name, scopes)) };

        let (args, kwargs) = node.child_by_field_name("arguments").map(|a| self.extract_arguments(a.as_ref(), source)).unwrap_or_default();

        if let Some(callee_id) = &callee_id {
            let edge_id = self.next_edge_id(EdgeKind::Calls, &caller_id, callee_id);
            let mut edge = Edge::new(edge_id, EdgeKind::Calls, caller_id.clone(), callee_id.clone()).with_span(span);
            edge.attrs.set("callee_name", callee_name.clone());

            // `obj.method(...)` where `obj` is a known local variable: tag the
            // receiver so the collection-store/load builder (§4.8) can find
            // it without re-parsing `callee_name`.
            if let Some((receiver, method)) = callee_name.rsplit_once('.') {
                let receiver_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));
                if let Some(receiver_id) = self.variables.get(&(receiver_fqn, receiver.to_string())) {
                    edge.attrs.set("receiver_var_id", receiver_id.as_str());
                    edge.attrs.set("method_name", method);
                }
            }

            if !args.is_empty() {
                let list: Vec<AttrValue> = args.iter().map(|s| s.as_str().into()).collect();
                edge.attrs.0.insert("call_args".into(), AttrValue::List(list));
            }
            if !kwargs.is_empty() {
                let mut map = std::collections::BTreeMap::new();
                for (k, v) in &kwargs {
                    map.insert(k.clone(), AttrValue::Str(v.clone()));
                }
                edge.attrs.0.insert("call_kwargs".into(), AttrValue::Map(map));
                if let Some(shell_value) = kwargs.get("shell") {
                    edge.attrs.set("has_shell_kwarg", true);
                    edge.attrs.set("shell_value", shell_value.as_str());
                }
            }
            out.edges.push(edge);
        }

        // Recurse into argument sub-expressions so nested calls are caught.
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for arg in arguments.children() {
                if arg.kind() == "call" {
                    self.handle_call(arg.as_ref(), source, scopes, out, occ_gen, expr_ids);
                } else if arg.kind() == "identifier" {
                    self.handle_identifier_read(arg.as_ref(), source, scopes, out, occ_gen, expr_ids);
                }
            }
        }

        let expr_id = expr_ids.next(&self.repo_id, &file_path, span.start_line, span.start_col);
        let mut expr = Expression::new(expr_id.clone(), ExprKind::Call, &self.repo_id, &file_path, span);
        expr.function_fqn = Some(function_fqn);
        expr.attrs.set("callee_name", callee_name);
        if !args.is_empty() {
            let list: Vec<AttrValue> = args.into_iter().map(AttrValue::from).collect();
            expr.attrs.0.insert("arg_expr_ids".into(), AttrValue::List(list));
        }
        out.expressions.push(expr);

        expr_id
    }

    fn extract_arguments(&self, arguments: &dyn AstNode, source: &[u8]) -> (Vec<String>, HashMap<String, String>) {
        let mut args = Vec::new();
        let mut kwargs = HashMap::new();
        for child in arguments.children() {
            if child.kind() == "keyword_argument" {
                let key = child.child_by_field_name("name").map(|n| node_text(n.as_ref(), source).to_string());
                let value = child.child_by_field_name("value").map(|n| node_text(n.as_ref(), source).to_string());
                if let (Some(key), Some(value)) = (key, value) {
                    kwargs.insert(key, value);
                }
            } else if !matches!(child.kind(), "(" | ")" | ",") {
                args.push(node_text(child.as_ref(), source).to_string());
            }
        }
        (args, kwargs)
    }

    /// Resolves a callee name to a node ID: local scope lookup first, then
    /// an external-function stub (materialized once per `(repo_id, name)`).
    fn resolve_callee(&mut self, name: &str, scopes: &[ScopeFrame]) -> String {
        let function_fqn = self.current_function_fqn(scopes).unwrap_or_else(|| self.current_fqn_prefix(scopes));
        if let Some(id) = self.variables.get(&(function_fqn, name.to_string())) {
            return id.clone();
        }
        self.get_or_create_external_function(name)
    }

    fn get_or_create_external_function(&mut self, name: &str) -> String {
        let cache_key = format!("{}:{name}", self.repo_id);
        if let Some(existing) = self.external_functions.get(&cache_key) {
            return existing.id.clone();
        }

        let (fqn, module_path) = external_fqn(name);
        let node_id = IdStrategy::node_id(&self.repo_id, &self.language, "function", &fqn, "<external>", name);
        let mut node = Node::new(node_id.clone(), NodeKind::Function, fqn, "<external>").with_language(&self.language);
        node.name = name.rsplit('.').next().unwrap_or(name).to_string();
        node.attrs.set("is_external", true);
        node.attrs.set("original_name", name);
        node.attrs.set("module_path", module_path);

        self.external_functions.insert(cache_key, node);
        node_id
    }

    /// Materialized external-function stub nodes, to be merged into the
    /// file's node list once per build session (they are not file-scoped).
    pub fn external_function_nodes(&self) -> Vec<Node> {
        self.external_functions.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::syntax_tree::{AstNode, SyntaxTree};

    #[derive(Clone)]
    struct FakeNode {
        kind: &'static str,
        span: Span,
        byte_range: (usize, usize),
        fields: HashMap<&'static str, FakeNode>,
        kids: Vec<FakeNode>,
    }

    impl FakeNode {
        fn leaf(kind: &'static str, byte_range: (usize, usize)) -> Self {
            Self { kind, span: Span::new(1, byte_range.0 as u32, 1, byte_range.1 as u32), byte_range, fields: HashMap::new(), kids: Vec::new() }
        }
    }

    impl AstNode for FakeNode {
        fn kind(&self) -> &str {
            self.kind
        }
        fn span(&self) -> Span {
            self.span
        }
        fn child_by_field_name(&self, field: &str) -> Option<Box<dyn AstNode>> {
            self.fields.get(field).cloned().map(|n| Box::new(n) as Box<dyn AstNode>)
        }
        fn children(&self) -> Vec<Box<dyn AstNode>> {
            self.kids.iter().cloned().map(|n| Box::new(n) as Box<dyn AstNode>).collect()
        }
        fn byte_range(&self) -> (usize, usize) {
            self.byte_range
        }
    }

    struct FakeTree {
        root: FakeNode,
        source: Vec<u8>,
    }

    impl SyntaxTree for FakeTree {
        fn root_node(&self) -> Box<dyn AstNode> {
            Box::new(self.root.clone())
        }
        fn source_bytes(&self) -> &[u8] {
            &self.source
        }
    }

    /// `def f():\n    os.system(cmd)\n`
    fn source_with_shell_call() -> FakeTree {
        let source = b"def f():\n    os.system(cmd)\n".to_vec();
        let callee = FakeNode::leaf("attribute", (13, 22)); // "os.system"
        let arg = FakeNode::leaf("identifier", (23, 26)); // "cmd"
        let mut arguments = FakeNode::leaf("arguments", (22, 27));
        arguments.kids = vec![arg];
        let mut call = FakeNode::leaf("call", (13, 27));
        call.fields.insert("function", callee);
        call.fields.insert("arguments", arguments);

        let mut body = FakeNode::leaf("block", (9, 28));
        body.kids = vec![call];

        let mut func = FakeNode::leaf("function_definition", (0, 28));
        func.fields.insert("name", FakeNode::leaf("identifier", (4, 5)));
        func.fields.insert("body", body);

        let mut module = FakeNode::leaf("module", (0, 28));
        module.kids = vec![func];

        FakeTree { root: module, source }
    }

    #[test]
    fn emits_calls_edge_to_external_stub() {
        let tree = source_with_shell_call();
        let mut adapter = LanguageAdapter::new("repo1", "python");
        let mut occ_gen = OccurrenceGenerator::new();
        let mut expr_ids = ExpressionIdCounter::default();
        let out = adapter.build_file("f.py", "f", &tree, &mut occ_gen, &mut expr_ids);

        assert!(out.nodes.iter().any(|n| n.kind == NodeKind::Function && n.fqn == "f.f"));
        let calls: Vec<&Edge> = out.edges.iter().filter(|e| e.kind == EdgeKind::Calls).collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].attrs.get_str("callee_name"), Some("os.system"));

        let externals = adapter.external_function_nodes();
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].fqn, "os.system");
        assert_eq!(externals[0].attrs.get_bool("is_external"), Some(true));
    }

    #[test]
    fn contains_edges_form_a_tree() {
        let tree = source_with_shell_call();
        let mut adapter = LanguageAdapter::new("repo1", "python");
        let mut occ_gen = OccurrenceGenerator::new();
        let mut expr_ids = ExpressionIdCounter::default();
        let out = adapter.build_file("f.py", "f", &tree, &mut occ_gen, &mut expr_ids);

        let file_id = out.nodes.iter().find(|n| n.kind == NodeKind::File).unwrap().id.clone();
        let func_id = out.nodes.iter().find(|n| n.kind == NodeKind::Function).unwrap().id.clone();
        assert!(out.edges.iter().any(|e| e.kind == EdgeKind::Contains && e.source_id == file_id && e.target_id == func_id));
    }

    #[test]
    fn builtins_resolve_via_shared_cache_not_duplicated() {
        let mut adapter = LanguageAdapter::new("repo1", "python");
        let id1 = adapter.get_or_create_external_function("len");
        let id2 = adapter.get_or_create_external_function("len");
        assert_eq!(id1, id2);
        assert_eq!(adapter.external_function_count(), 1);
    }
}

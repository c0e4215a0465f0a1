//! k-CFA call-string context manager (§4.11).

use std::collections::HashMap;

/// A call-string context truncated to depth `k`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallContext(pub Vec<String>);

impl CallContext {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn push(&self, call_site: &str, k: usize) -> Self {
        let mut ctx = self.0.clone();
        ctx.push(call_site.to_string());
        if ctx.len() > k {
            let excess = ctx.len() - k;
            ctx.drain(0..excess);
        }
        Self(ctx)
    }
}

/// Maintains call-string contexts up to depth `k` (default 2). Rebuilt
/// whenever `k_limit` changes.
pub struct ContextManager {
    k_limit: usize,
    contexts: HashMap<String, Vec<CallContext>>,
}

impl ContextManager {
    pub fn new(k_limit: usize) -> Self {
        Self { k_limit, contexts: HashMap::new() }
    }

    pub fn k_limit(&self) -> usize {
        self.k_limit
    }

    pub fn set_k_limit(&mut self, k_limit: usize) {
        if k_limit != self.k_limit {
            self.k_limit = k_limit;
            self.contexts.clear();
        }
    }

    pub fn record_call(&mut self, callee_fqn: &str, caller_context: &CallContext, call_site: &str) -> CallContext {
        let new_ctx = caller_context.push(call_site, self.k_limit);
        self.contexts.entry(callee_fqn.to_string()).or_default().push(new_ctx.clone());
        new_ctx
    }

    pub fn contexts_for(&self, fqn: &str) -> &[CallContext] {
        self.contexts.get(fqn).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

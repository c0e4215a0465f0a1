//! Diagnostics subscriber port (§6.2): callback-based push model for
//! `textDocument/publishDiagnostics`, with per-file TTL and severity
//! filters owned by the infrastructure adapter.

use super::lsp::DiagnosticSeverityLevel;

#[derive(Debug, Clone)]
pub struct PublishedDiagnostic {
    pub file_path: String,
    pub message: String,
    pub severity: DiagnosticSeverityLevel,
    pub line: u32,
}

pub trait DiagnosticsSubscriberPort: Send + Sync {
    fn on_diagnostics(&self, diagnostics: Vec<PublishedDiagnostic>);
    fn set_severity_filter(&mut self, min_severity: DiagnosticSeverityLevel);
}

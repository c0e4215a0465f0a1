//! Result envelope (§6.3): the shape every analysis engine's output is
//! wrapped in before it leaves the core — a `summary` plus the `Claim`s it
//! asserts and the `Evidence` that backs them, tagged with which engine and
//! version produced it. Analysis engines build a [`CostResult`]-style
//! domain value first and wrap it at the boundary; the envelope itself
//! carries no analysis logic.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBasis {
    Proven,
    Inferred,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claim {
    pub id: String,
    pub claim_type: String,
    pub confidence_basis: ConfidenceBasis,
    pub severity: Severity,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Provenance {
    pub engine: String,
    pub version: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Evidence {
    pub kind: String,
    pub content: Value,
    pub provenance: Provenance,
    pub claim_ids: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResultEnvelope {
    pub request_id: String,
    pub summary: String,
    pub claims: Vec<Claim>,
    pub evidences: Vec<Evidence>,
}

impl ResultEnvelope {
    pub fn new(request_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self { request_id: request_id.into(), summary: summary.into(), claims: Vec::new(), evidences: Vec::new() }
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidences.push(evidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_accumulate_claims_and_evidence() {
        let claim = Claim {
            id: "claim1".into(),
            claim_type: "cost".into(),
            confidence_basis: ConfidenceBasis::Proven,
            severity: Severity::Medium,
            subject: "f".into(),
            description: "quadratic cost".into(),
        };
        let evidence = Evidence {
            kind: "COST_TERM".into(),
            content: serde_json::json!({"cost_term": "n * m"}),
            provenance: Provenance { engine: "CostAnalyzer".into(), version: "1".into(), model: None },
            claim_ids: vec!["claim1".into()],
        };
        let envelope = ResultEnvelope::new("req1", "cost analysis").with_claim(claim).with_evidence(evidence);
        assert_eq!(envelope.claims.len(), 1);
        assert_eq!(envelope.evidences.len(), 1);
        assert_eq!(envelope.evidences[0].claim_ids, vec!["claim1".to_string()]);
    }
}

//! Rule compiler: declarative atom/policy specs -> sorted `CompiledRule`s
//! (§4.9).

use crate::errors::{CoreError, CoreResult};

use super::domain::{AtomKind, CompiledRule, Effect, GeneratorKind, Predicate, Prefilter};

/// A declarative rule specification, prior to compilation.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub rule_id: String,
    pub atom_id: String,
    pub kind: AtomKind,
    pub base_type: Option<String>,
    pub call: Option<String>,
    pub call_prefix: Option<String>,
    pub type_suffix: Option<String>,
    pub trigram_literal: Option<String>,
    pub predicates: Vec<Predicate>,
    pub confidence_base: f64,
    pub report_threshold: f64,
    pub taint_arg_positions: Vec<usize>,
    pub vulnerability_policy_id: Option<String>,
}

pub struct TaintRuleCompiler {
    max_rules: usize,
}

impl TaintRuleCompiler {
    pub fn new(max_rules: usize) -> Self {
        Self { max_rules }
    }

    fn generator_plan(spec: &RuleSpec) -> CoreResult<Vec<GeneratorKind>> {
        let mut plan = Vec::new();
        if let (Some(base_type), Some(call)) = (&spec.base_type, &spec.call) {
            plan.push(GeneratorKind::ExactTypeCall { base_type: base_type.clone(), call: call.clone() });
        }
        if let Some(call) = &spec.call {
            plan.push(GeneratorKind::ExactCall { call: call.clone() });
        }
        if let Some(prefix) = &spec.call_prefix {
            plan.push(GeneratorKind::CallPrefix { prefix: prefix.clone() });
        }
        if let Some(suffix) = &spec.type_suffix {
            plan.push(GeneratorKind::TypeSuffix { suffix: suffix.clone() });
        }
        if let Some(literal) = &spec.trigram_literal {
            if literal.is_empty() {
                return Err(CoreError::validation("trigram literal must not be empty"));
            }
            plan.push(GeneratorKind::TypeTrigram { literal: literal.clone() });
        }
        if plan.is_empty() {
            plan.push(GeneratorKind::Fallback);
        }
        plan.sort_by_key(|g| g.specificity_rank());
        Ok(plan)
    }

    fn specificity_score(spec: &RuleSpec, generators: &[GeneratorKind]) -> f64 {
        let generator_score = generators.iter().map(|g| 10.0 - g.specificity_rank() as f64).sum::<f64>();
        let predicate_score = spec.predicates.len() as f64 * 2.0;
        let kind_score = match spec.kind {
            AtomKind::Sink => 5.0,
            AtomKind::Source => 4.0,
            AtomKind::Sanitizer => 3.0,
            AtomKind::Propagator => 2.0,
        };
        generator_score + predicate_score + kind_score
    }

    /// §9: external function FQNs (`external.{name}`) must not be
    /// accidentally matched by prefix rules targeting `builtins.*`.
    fn validate_no_external_collision(spec: &RuleSpec) -> CoreResult<()> {
        if let Some(prefix) = &spec.call_prefix {
            if prefix.starts_with("builtins.") && "external.".starts_with(prefix.as_str()) {
                return Err(CoreError::validation(format!(
                    "call_prefix {prefix:?} would collide with the external.* namespace"
                )));
            }
        }
        Ok(())
    }

    pub fn compile(&self, specs: Vec<RuleSpec>) -> CoreResult<Vec<CompiledRule>> {
        if specs.len() > self.max_rules {
            return Err(CoreError::resource_exhausted("taint_rules", self.max_rules));
        }

        let mut compiled = Vec::with_capacity(specs.len());
        for spec in specs {
            Self::validate_no_external_collision(&spec)?;
            let generators = Self::generator_plan(&spec)?;
            let specificity_score = Self::specificity_score(&spec, &generators);

            let prefilters = vec![Prefilter {
                call_starts_with: spec.call_prefix.clone(),
                type_ends_with: spec.type_suffix.clone(),
                has_arg_index: spec.taint_arg_positions.first().copied(),
            }];

            compiled.push(CompiledRule {
                rule_id: spec.rule_id,
                atom_id: spec.atom_id,
                specificity_score,
                tier: generators.first().map(|g| g.specificity_rank()).unwrap_or(5),
                generators,
                prefilters,
                predicates: spec.predicates,
                confidence_base: spec.confidence_base,
                report_threshold: spec.report_threshold,
                effect: Effect {
                    kind: spec.kind,
                    taint_arg_positions: spec.taint_arg_positions,
                    vulnerability_policy_id: spec.vulnerability_policy_id,
                },
            });
        }

        compiled.sort();
        Ok(compiled)
    }
}

//! Cost analysis domain model: complexity classes, bounds, verdicts.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
}

impl ComplexityClass {
    fn order_index(self) -> u8 {
        match self {
            ComplexityClass::Constant => 0,
            ComplexityClass::Logarithmic => 1,
            ComplexityClass::Linear => 2,
            ComplexityClass::Linearithmic => 3,
            ComplexityClass::Quadratic => 4,
            ComplexityClass::Cubic => 5,
            ComplexityClass::Exponential => 6,
        }
    }

    /// §4.12 step 6: 0 factors -> CONSTANT, 1 -> LINEAR, 2 -> QUADRATIC,
    /// 3 -> CUBIC, >= 4 -> EXPONENTIAL.
    pub fn from_factor_count(factors: usize) -> Self {
        match factors {
            0 => ComplexityClass::Constant,
            1 => ComplexityClass::Linear,
            2 => ComplexityClass::Quadratic,
            3 => ComplexityClass::Cubic,
            _ => ComplexityClass::Exponential,
        }
    }

    pub fn is_slow(self) -> bool {
        self.order_index() >= ComplexityClass::Quadratic.order_index()
    }
}

impl PartialOrd for ComplexityClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComplexityClass {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_index().cmp(&other.order_index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Proven,
    Likely,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMethod {
    Pattern,
    Sccp,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BoundResult {
    pub bound: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub method: InferenceMethod,
    pub loop_id: String,
    pub upper_bound_hint: Option<String>,
}

impl BoundResult {
    /// Confidence/verdict consistency is enforced at construction: a
    /// `Proven` bound must carry confidence >= 0.8; a `Heuristic` bound
    /// must carry confidence <= 0.5.
    pub fn new(
        bound: impl Into<String>,
        verdict: Verdict,
        confidence: f64,
        method: InferenceMethod,
        loop_id: impl Into<String>,
        upper_bound_hint: Option<String>,
    ) -> Result<Self, String> {
        match verdict {
            Verdict::Proven if confidence < 0.8 => {
                return Err(format!("proven bound requires confidence >= 0.8, got {confidence}"))
            }
            Verdict::Heuristic if confidence > 0.5 => {
                return Err(format!("heuristic bound requires confidence <= 0.5, got {confidence}"))
            }
            _ => {}
        }
        Ok(Self {
            bound: bound.into(),
            verdict,
            confidence,
            method,
            loop_id: loop_id.into(),
            upper_bound_hint,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Hotspot {
    pub loop_id: String,
    pub nesting_level: u32,
    pub bound: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CostResult {
    pub function_name: String,
    pub complexity: ComplexityClass,
    pub cost_term: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub loop_bounds: Vec<BoundResult>,
    pub hotspots: Vec<Hotspot>,
}

impl CostResult {
    pub fn is_slow(&self) -> bool {
        self.complexity.is_slow()
    }
}

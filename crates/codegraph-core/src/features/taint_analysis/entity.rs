//! The flattened view of an IR node/expression the taint executor matches
//! rules against.

use crate::shared::models::Attrs;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: String,
    pub call: Option<String>,
    pub base_type: Option<String>,
    pub args: Vec<String>,
    pub tainted_arg_positions: Vec<usize>,
    pub attrs: Attrs,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            call: None,
            base_type: None,
            args: Vec::new(),
            tainted_arg_positions: Vec::new(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_call(mut self, call: impl Into<String>) -> Self {
        self.call = Some(call.into());
        self
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_tainted(mut self, positions: Vec<usize>) -> Self {
        self.tainted_arg_positions = positions;
        self
    }

    pub fn arg_is_tainted(&self, position: usize) -> bool {
        self.tainted_arg_positions.contains(&position)
    }
}

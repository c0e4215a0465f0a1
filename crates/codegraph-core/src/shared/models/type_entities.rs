//! Type entities produced by the semantic IR builder's type phase.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFlavor {
    Builtin,
    User,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLevel {
    Raw,
    Resolved,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TypeEntity {
    pub id: String,
    pub raw: String,
    pub flavor: TypeFlavor,
    pub is_nullable: bool,
    pub resolution_level: ResolutionLevel,
    pub resolved_target: Option<String>,
    pub generic_param_ids: Vec<String>,
}

impl TypeEntity {
    pub fn new(id: impl Into<String>, raw: impl Into<String>, flavor: TypeFlavor) -> Self {
        Self {
            id: id.into(),
            raw: raw.into(),
            flavor,
            is_nullable: false,
            resolution_level: ResolutionLevel::Raw,
            resolved_target: None,
            generic_param_ids: Vec::new(),
        }
    }

    pub fn resolved(mut self, target: impl Into<String>) -> Self {
        self.resolved_target = Some(target.into());
        self.resolution_level = ResolutionLevel::Resolved;
        self
    }
}

/// Variable entity built from expression defines/reads; carries an SSA
/// shadow index to disambiguate reassignments within a block.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VariableEntity {
    pub id: String,
    pub name: String,
    pub function_fqn: String,
    pub block_id: String,
    pub shadow_index: u32,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdfgEdgeKind {
    CollectionStore,
    CollectionLoad,
    CallArg,
    Return,
}

/// Interprocedural data-flow edge, including collection store/load edges
/// from the heap-sensitive layer (§4.8).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InterproceduralDataFlowEdge {
    pub id: String,
    pub kind: IdfgEdgeKind,
    pub from_var_id: String,
    pub to_var_id: String,
    pub call_site_id: Option<String>,
    pub caller_fqn: Option<String>,
    pub callee_fqn: Option<String>,
    pub arg_position: Option<u32>,
    pub collection_var_id: Option<String>,
    pub element_key: Option<String>,
}

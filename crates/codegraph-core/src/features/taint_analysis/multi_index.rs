//! Indices built once per execution over the entity set, backing each
//! generator kind (§4.10 step 1).

use std::collections::HashMap;

use super::entity::Entity;
use super::trigram::TrigramIndex;

pub struct MultiIndex<'a> {
    pub exact_type_call: HashMap<(String, String), Vec<&'a Entity>>,
    pub exact_call: HashMap<String, Vec<&'a Entity>>,
    pub all: Vec<&'a Entity>,
    pub trigram: TrigramIndex,
    entity_by_call: HashMap<String, Vec<&'a Entity>>,
    entity_by_base_type: HashMap<String, Vec<&'a Entity>>,
}

impl<'a> MultiIndex<'a> {
    pub fn build(entities: &'a [Entity], max_trigram_patterns: usize) -> Self {
        let mut exact_type_call: HashMap<(String, String), Vec<&Entity>> = HashMap::new();
        let mut exact_call: HashMap<String, Vec<&Entity>> = HashMap::new();
        let mut entity_by_call: HashMap<String, Vec<&Entity>> = HashMap::new();
        let mut entity_by_base_type: HashMap<String, Vec<&Entity>> = HashMap::new();
        let mut trigram = TrigramIndex::new(max_trigram_patterns);
        let mut all = Vec::with_capacity(entities.len());

        for e in entities {
            all.push(e);
            if let Some(call) = &e.call {
                exact_call.entry(call.clone()).or_default().push(e);
                entity_by_call.entry(call.clone()).or_default().push(e);
                let _ = trigram.add_pattern(&e.id, call);
                if let Some(base_type) = &e.base_type {
                    exact_type_call.entry((base_type.clone(), call.clone())).or_default().push(e);
                }
            }
            if let Some(base_type) = &e.base_type {
                entity_by_base_type.entry(base_type.clone()).or_default().push(e);
            }
        }

        Self { exact_type_call, exact_call, all, trigram, entity_by_call, entity_by_base_type }
    }

    pub fn by_call_prefix(&self, prefix: &str) -> Vec<&'a Entity> {
        self.entity_by_call
            .iter()
            .filter(|(call, _)| call.starts_with(prefix))
            .flat_map(|(_, v)| v.iter().copied())
            .collect()
    }

    pub fn by_type_suffix(&self, suffix: &str) -> Vec<&'a Entity> {
        self.entity_by_base_type
            .iter()
            .filter(|(base_type, _)| base_type.ends_with(suffix))
            .flat_map(|(_, v)| v.iter().copied())
            .collect()
    }
}

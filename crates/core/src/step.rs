//! Pipeline steps (Layout, Animation, Comp, ...).

use serde::Serialize;

use crate::error::CoreResult;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// A pipeline step. Referenced by tasks, and through them by publishes and
/// versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Step {
    pub name: String,
    pub id: DbId,
    pub short_name: String,
    /// Entity type this step applies to (`Shot`, `Asset`, ...).
    pub for_entity_type: String,
    #[serde(skip)]
    pub raw: RawRecord,
}

impl Step {
    pub fn new(name: impl Into<String>, id: DbId) -> Self {
        Self {
            name: name.into(),
            id,
            ..Default::default()
        }
    }

    /// Build a step from a raw `Step` record. `id` is mandatory.
    pub fn build(raw: &RawRecord) -> CoreResult<Self> {
        let id = raw::required_id(raw, "Step")?;
        Ok(Self {
            name: raw::entity_name(raw),
            id,
            short_name: raw::str_or_empty(raw, "short_name"),
            for_entity_type: raw::str_or_empty(raw, "entity_type"),
            raw: raw.clone(),
        })
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

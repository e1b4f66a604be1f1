use serde::Serialize;

use super::{Asset, EntityBase, EntityType, ParentRef, Sequence, Shot};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// An episode. Always parented to the project.
#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    pub base: EntityBase,
    pub sequences: Vec<Sequence>,
    pub shots: Vec<Shot>,
    pub assets: Vec<Asset>,
}

impl Episode {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        let mut base = EntityBase::new(project, EntityType::Episode, name, id);
        base.parent = Some(ParentRef::project(project));
        Self {
            base,
            sequences: Vec::new(),
            shots: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Build an episode from a raw `Episode` record, including embedded
    /// `sequences`, `sg_shots` and `assets`.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Episode, raw)?;
        base.parent = Some(ParentRef::project(project));
        Ok(Self {
            base,
            sequences: raw::records(raw, "sequences")
                .into_iter()
                .map(|r| Sequence::build(project, r))
                .collect::<CoreResult<_>>()?,
            shots: raw::records(raw, "sg_shots")
                .into_iter()
                .map(|r| Shot::build(project, r))
                .collect::<CoreResult<_>>()?,
            assets: raw::records(raw, "assets")
                .into_iter()
                .map(|r| Asset::build(project, r))
                .collect::<CoreResult<_>>()?,
        })
    }
}

impl std::fmt::Display for Episode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

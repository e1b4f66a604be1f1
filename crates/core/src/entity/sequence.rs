use serde::Serialize;

use super::{Asset, EntityBase, EntityType, Episode, ParentRef, Shot};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// A sequence of shots. Parented to its episode, or to the project.
#[derive(Debug, Clone, Serialize)]
pub struct Sequence {
    pub base: EntityBase,
    pub episode: Option<Box<Episode>>,
    pub shots: Vec<Shot>,
    pub assets: Vec<Asset>,
}

impl Sequence {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        let mut base = EntityBase::new(project, EntityType::Sequence, name, id);
        base.parent = Some(ParentRef::project(project));
        Self {
            base,
            episode: None,
            shots: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Build a sequence from a raw `Sequence` record, including any embedded
    /// `episode`, `shots` and `assets`.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Sequence, raw)?;
        let episode = raw::record(raw, "episode")
            .map(|r| Episode::build(project, r))
            .transpose()?;
        base.parent = Some(match &episode {
            Some(episode) => episode.base.as_parent(),
            None => ParentRef::project(project),
        });
        Ok(Self {
            base,
            episode: episode.map(Box::new),
            shots: raw::records(raw, "shots")
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

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

use serde::Serialize;

use super::{EntityBase, EntityType, Version};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// A review playlist. Its versions live in `base.versions`, so the version
/// search works on playlists directly.
#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub base: EntityBase,
    pub description: String,
}

impl Playlist {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::Playlist, name, id),
            description: String::new(),
        }
    }

    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Playlist, raw)?;
        base.versions = raw::records(raw, "versions")
            .into_iter()
            .map(|r| Version::build(project, r))
            .collect::<CoreResult<_>>()?;
        Ok(Self {
            base,
            description: raw::str_or_empty(raw, "description"),
        })
    }
}

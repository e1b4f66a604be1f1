//! The project root of the entity tree.

use serde::Serialize;

use crate::entity::{Asset, Entity, Episode, Publish, Sequence, Shot, Task, Version};
use crate::error::CoreResult;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// Entity type string reported for projects.
pub const PROJECT_TYPE: &str = "Project";

/// A production project. Owns the top-level entity lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Project {
    pub name: String,
    pub id: DbId,
    /// File-system container name (`tank_name`).
    pub container: String,
    pub status: String,
    pub project_type: String,
    pub sg_type: String,
    pub template: bool,
    /// Project-wide handle defaults (`sg_handles_in` / `sg_handles_out`).
    pub handles_in: Option<i64>,
    pub handles_out: Option<i64>,

    pub episodes: Vec<Episode>,
    pub sequences: Vec<Sequence>,
    pub shots: Vec<Shot>,
    pub assets: Vec<Asset>,
    pub publishes: Vec<Publish>,
    pub versions: Vec<Version>,
    pub tasks: Vec<Task>,

    #[serde(skip)]
    pub raw: RawRecord,
}

impl Project {
    /// A project with the given name and no tracking data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_type: PROJECT_TYPE.to_string(),
            sg_type: PROJECT_TYPE.to_string(),
            ..Default::default()
        }
    }

    /// Build a project from a raw `Project` record. `id` is mandatory.
    pub fn build(raw: &RawRecord) -> CoreResult<Self> {
        let id = raw::required_id(raw, PROJECT_TYPE)?;
        let mut project = Self::new(raw::entity_name(raw));
        project.id = id;
        project.container = raw::str_or_empty(raw, "tank_name");
        project.status = raw::str_or_empty(raw, "sg_status");
        project.sg_type = raw::opt_str(raw, "type").unwrap_or_else(|| PROJECT_TYPE.to_string());
        if let Some(kind) = raw::opt_str(raw, "sg_type") {
            project.project_type = kind;
        }
        project.template = raw::flag(raw, "is_template");
        project.handles_in = raw::opt_int(raw, "sg_handles_in");
        project.handles_out = raw::opt_int(raw, "sg_handles_out");
        project.raw = raw.clone();
        Ok(project)
    }

    /// File an entity under the matching project list.
    ///
    /// Kinds without a project-level list (asset instances, cuts,
    /// playlists) are returned unchanged.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Episode(e) => self.episodes.push(e),
            Entity::Sequence(e) => self.sequences.push(e),
            Entity::Shot(e) => self.shots.push(e),
            Entity::Asset(e) => self.assets.push(e),
            Entity::Task(e) => self.tasks.push(e),
            Entity::Publish(e) => self.publishes.push(e),
            Entity::Version(e) => self.versions.push(e),
            other => return Some(other),
        }
        None
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

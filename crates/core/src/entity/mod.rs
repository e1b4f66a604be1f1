//! Typed production entities built from raw tracking records.
//!
//! Every tracked kind is a struct holding a shared [`EntityBase`] plus its
//! own fields. [`Entity`] is the tagged union over those kinds, used where a
//! record's kind is only known at runtime (payload dispatch, parent links)
//! and as the receiver of the step searches.

mod asset;
mod cut;
mod episode;
mod playlist;
mod publish;
mod sequence;
mod shot;
mod task;
mod version;

pub use asset::{Asset, AssetInstance, LOD_SUFFIXES};
pub use cut::Cut;
pub use episode::Episode;
pub use playlist::Playlist;
pub use publish::{Publish, ALEMBIC_CACHE_TYPE};
pub use sequence::Sequence;
pub use shot::{EditRange, Shot, ShotFrames};
pub use task::Task;
pub use version::Version;

use serde::Serialize;

use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::search::{self, PublishQuery, VersionQuery};
use crate::types::{DbId, RawRecord, Timestamp};
use crate::user::{Note, User};

// ---------------------------------------------------------------------------
// Entity type
// ---------------------------------------------------------------------------

/// Kind of a tracked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Episode,
    Sequence,
    Shot,
    Asset,
    AssetInstance,
    Task,
    Step,
    Publish,
    Version,
    Cut,
    Playlist,
    User,
    Note,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Episode => "Episode",
            Self::Sequence => "Sequence",
            Self::Shot => "Shot",
            Self::Asset => "Asset",
            Self::AssetInstance => "AssetInstance",
            Self::Task => "Task",
            Self::Step => "Step",
            Self::Publish => "Publish",
            Self::Version => "Version",
            Self::Cut => "Cut",
            Self::Playlist => "Playlist",
            Self::User => "User",
            Self::Note => "Note",
            Self::Other => "Other",
        }
    }

    /// Map a tracking-system `type` string onto a kind.
    ///
    /// Accepts the tracker's own names (`PublishedFile`, `HumanUser`) as
    /// well as the kind names.
    pub fn from_sg_type(sg_type: &str) -> Self {
        match sg_type {
            "Project" => Self::Project,
            "Episode" => Self::Episode,
            "Sequence" => Self::Sequence,
            "Shot" => Self::Shot,
            "Asset" => Self::Asset,
            "AssetInstance" => Self::AssetInstance,
            "Task" => Self::Task,
            "Step" => Self::Step,
            "PublishedFile" | "TankPublishedFile" | "Publish" => Self::Publish,
            "Version" => Self::Version,
            "Cut" => Self::Cut,
            "Playlist" => Self::Playlist,
            "HumanUser" | "ApiUser" | "User" => Self::User,
            "Note" => Self::Note,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parent reference
// ---------------------------------------------------------------------------

/// Link to a parent entity by kind, id and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    pub entity_type: EntityType,
    /// The tracker's own type string, kept for kinds mapped to `Other`.
    pub sg_type: String,
    pub id: DbId,
    pub name: String,
}

impl ParentRef {
    pub fn project(project: &Project) -> Self {
        Self {
            entity_type: EntityType::Project,
            sg_type: project.sg_type.clone(),
            id: project.id,
            name: project.name.clone(),
        }
    }

    /// Reference the entity summarised by `raw` (`{type, id, name}`).
    pub fn from_raw(raw: &RawRecord) -> CoreResult<Self> {
        let sg_type = raw::str_or_empty(raw, "type");
        let entity_type = EntityType::from_sg_type(&sg_type);
        Ok(Self {
            id: raw::required_id(raw, entity_type.as_str())?,
            name: raw::entity_name(raw),
            entity_type,
            sg_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Shared base record
// ---------------------------------------------------------------------------

/// Fields common to every tracked entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityBase {
    pub id: DbId,
    pub name: String,
    pub entity_type: EntityType,
    /// The tracker's `type` string; defaults to the kind name.
    pub sg_type: String,
    pub project_id: DbId,
    pub parent: Option<ParentRef>,
    pub tags: Vec<String>,

    pub publishes: Vec<Publish>,
    pub versions: Vec<Version>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,

    pub created_by: Option<User>,
    pub date_created: Option<Timestamp>,
    pub updated_by: Option<User>,
    pub date_updated: Option<Timestamp>,

    /// The record this entity was built from.
    #[serde(skip)]
    pub raw: RawRecord,
}

impl EntityBase {
    pub fn new(project: &Project, entity_type: EntityType, name: impl Into<String>, id: DbId) -> Self {
        Self {
            id,
            name: name.into(),
            entity_type,
            sg_type: entity_type.as_str().to_string(),
            project_id: project.id,
            parent: None,
            tags: Vec::new(),
            publishes: Vec::new(),
            versions: Vec::new(),
            tasks: Vec::new(),
            notes: Vec::new(),
            created_by: None,
            date_created: None,
            updated_by: None,
            date_updated: None,
            raw: RawRecord::new(),
        }
    }

    /// Read the common fields of `raw`. Only `id` is mandatory.
    pub(crate) fn from_raw(
        project: &Project,
        entity_type: EntityType,
        raw: &RawRecord,
    ) -> CoreResult<Self> {
        let id = raw::required_id(raw, entity_type.as_str())?;
        let mut base = Self::new(project, entity_type, raw::entity_name(raw), id);
        if let Some(sg_type) = raw::opt_str(raw, "type") {
            base.sg_type = sg_type;
        }
        base.tags = raw::tags(raw);
        base.notes = raw::records(raw, "notes").into_iter().map(Note::build).collect();
        base.created_by = raw::record(raw, "created_by").map(User::from_summary);
        base.date_created = raw::opt_timestamp(raw, "created_at");
        base.updated_by = raw::record(raw, "updated_by").map(User::from_summary);
        base.date_updated = raw::opt_timestamp(raw, "updated_at");
        base.raw = raw.clone();
        Ok(base)
    }

    /// A reference to this entity for use as a child's parent.
    pub fn as_parent(&self) -> ParentRef {
        ParentRef {
            entity_type: self.entity_type,
            sg_type: self.sg_type.clone(),
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Sort `publishes` latest first.
    pub fn sort_publishes(&mut self) {
        search::sort_publishes(&mut self.publishes);
    }

    /// Sort `versions` latest first.
    pub fn sort_versions(&mut self) {
        search::sort_versions(&mut self.versions);
    }
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Any tracked entity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Episode(Episode),
    Sequence(Sequence),
    Shot(Shot),
    Asset(Asset),
    AssetInstance(AssetInstance),
    Task(Task),
    Publish(Publish),
    Version(Version),
    Cut(Cut),
    Playlist(Playlist),
}

impl Entity {
    /// Build whichever kind `raw["type"]` names.
    ///
    /// Returns `Ok(None)` for types with no entity kind (projects, steps,
    /// users and anything unrecognised).
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Option<Self>> {
        let sg_type = raw::str_or_empty(raw, "type");
        Self::build_as(project, EntityType::from_sg_type(&sg_type), raw)
    }

    /// Build `raw` as the given kind, ignoring its `type` field.
    pub fn build_as(
        project: &Project,
        entity_type: EntityType,
        raw: &RawRecord,
    ) -> CoreResult<Option<Self>> {
        let entity = match entity_type {
            EntityType::Episode => Self::Episode(Episode::build(project, raw)?),
            EntityType::Sequence => Self::Sequence(Sequence::build(project, raw)?),
            EntityType::Shot => Self::Shot(Shot::build(project, raw)?),
            EntityType::Asset => Self::Asset(Asset::build(project, raw)?),
            EntityType::AssetInstance => Self::AssetInstance(AssetInstance::build(project, raw)?),
            EntityType::Task => Self::Task(Task::build(project, raw)?),
            EntityType::Publish => Self::Publish(Publish::build(project, raw)?),
            EntityType::Version => Self::Version(Version::build(project, raw)?),
            EntityType::Cut => Self::Cut(Cut::build(project, raw)?),
            EntityType::Playlist => Self::Playlist(Playlist::build(project, raw)?),
            other => {
                tracing::debug!(entity_type = %other, "No entity kind for record type");
                return Ok(None);
            }
        };
        Ok(Some(entity))
    }

    pub fn base(&self) -> &EntityBase {
        match self {
            Self::Episode(e) => &e.base,
            Self::Sequence(e) => &e.base,
            Self::Shot(e) => &e.base,
            Self::Asset(e) => &e.base,
            Self::AssetInstance(e) => &e.base,
            Self::Task(e) => &e.base,
            Self::Publish(e) => &e.base,
            Self::Version(e) => &e.base,
            Self::Cut(e) => &e.base,
            Self::Playlist(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut EntityBase {
        match self {
            Self::Episode(e) => &mut e.base,
            Self::Sequence(e) => &mut e.base,
            Self::Shot(e) => &mut e.base,
            Self::Asset(e) => &mut e.base,
            Self::AssetInstance(e) => &mut e.base,
            Self::Task(e) => &mut e.base,
            Self::Publish(e) => &mut e.base,
            Self::Version(e) => &mut e.base,
            Self::Cut(e) => &mut e.base,
            Self::Playlist(e) => &mut e.base,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.base().entity_type
    }

    pub fn id(&self) -> DbId {
        self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Latest (or a specific version of the) publish for a step.
    ///
    /// See [`search::publish_for_step`] for the matching rules. Publishes do
    /// not own publishes, so calling this on a [`Entity::Publish`] is an
    /// [`CoreError::InvalidOperation`](crate::error::CoreError::InvalidOperation).
    pub fn publish_for_step(&self, query: &PublishQuery<'_>) -> CoreResult<Option<&Publish>> {
        search::publish_for_step(self.base(), query)
    }

    /// Latest (or a specific) version for a step.
    pub fn version_for_step(&self, query: &VersionQuery<'_>) -> Option<&Version> {
        search::version_for_step(self.base(), query)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! impl_from_kind {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Entity {
                fn from(value: $kind) -> Self {
                    Self::$kind(value)
                }
            }
        )*
    };
}

impl_from_kind!(Episode, Sequence, Shot, Asset, AssetInstance, Task, Publish, Version, Cut, Playlist);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn rec(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn sg_type_mapping() {
        assert_eq!(EntityType::from_sg_type("PublishedFile"), EntityType::Publish);
        assert_eq!(EntityType::from_sg_type("HumanUser"), EntityType::User);
        assert_eq!(EntityType::from_sg_type("CustomEntity01"), EntityType::Other);
    }

    #[test]
    fn build_dispatches_on_type() {
        let project = Project::new("Comet");
        let entity = Entity::build(&project, &rec(json!({"type": "Asset", "id": 3, "code": "robot"})))
            .unwrap()
            .unwrap();
        assert_eq!(entity.entity_type(), EntityType::Asset);
        assert_eq!(entity.name(), "robot");
    }

    #[test]
    fn build_unknown_type_is_none() {
        let project = Project::new("Comet");
        let entity = Entity::build(&project, &rec(json!({"type": "CustomEntity01", "id": 3}))).unwrap();
        assert!(entity.is_none());
    }

    #[test]
    fn build_propagates_missing_id() {
        let project = Project::new("Comet");
        assert_matches!(
            Entity::build(&project, &rec(json!({"type": "Shot", "code": "SH010"}))),
            Err(CoreError::MissingField { entity: "Shot", field: "id" })
        );
    }

    #[test]
    fn base_defaults_sg_type_to_kind_name() {
        let project = Project::new("Comet");
        let base = EntityBase::from_raw(&project, EntityType::Shot, &rec(json!({"id": 1}))).unwrap();
        assert_eq!(base.sg_type, "Shot");
        assert_eq!(base.name, "");
        assert!(base.tags.is_empty());
        assert!(base.created_by.is_none());
    }

    #[test]
    fn base_reads_audit_fields() {
        let project = Project::new("Comet");
        let raw = rec(json!({
            "id": 1,
            "created_by": {"type": "HumanUser", "id": 2, "name": "Ada"},
            "created_at": "2024-05-01T12:00:00Z",
            "notes": [{"type": "Note", "id": 8, "name": "Retime"}],
        }));
        let base = EntityBase::from_raw(&project, EntityType::Shot, &raw).unwrap();
        assert_eq!(base.created_by.map(|u| u.name), Some("Ada".to_string()));
        assert!(base.date_created.is_some());
        assert_eq!(base.notes[0].subject, "Retime");
    }

    #[test]
    fn parent_ref_requires_id() {
        assert_matches!(
            ParentRef::from_raw(&rec(json!({"type": "Sequence", "code": "SQ01"}))),
            Err(CoreError::MissingField { entity: "Sequence", .. })
        );
    }
}

use serde::Serialize;

use super::{EntityBase, EntityType, Task, Version};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::step::Step;
use crate::types::{DbId, RawRecord};

/// Published-file-type name of Alembic geometry caches.
pub const ALEMBIC_CACHE_TYPE: &str = "Alembic Cache";

/// A published file. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Publish {
    pub base: EntityBase,
    pub file_path: String,
    pub linked_versions: Vec<Version>,
    pub version_number: i64,
    /// Step of the producing task.
    pub step: Option<Step>,
    pub task: Option<Box<Task>>,
    pub description: String,
    pub published_file_type: String,
    pub category: String,
    pub path_cache: String,
    pub plate_name: String,
}

impl Publish {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::Publish, name, id),
            file_path: String::new(),
            linked_versions: Vec::new(),
            version_number: 0,
            step: None,
            task: None,
            description: String::new(),
            published_file_type: String::new(),
            category: String::new(),
            path_cache: String::new(),
            plate_name: String::new(),
        }
    }

    /// Build a publish from a raw `PublishedFile` record.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let base = EntityBase::from_raw(project, EntityType::Publish, raw)?;
        let task = raw::record(raw, "task")
            .map(|r| Task::build(project, r))
            .transpose()?;
        let linked_versions: Vec<Version> = raw::record(raw, "version")
            .map(|r| Version::build(project, r))
            .transpose()?
            .into_iter()
            .collect();

        Ok(Self {
            base,
            file_path: raw::record(raw, "path")
                .map(|path| raw::str_or_empty(path, "local_path_windows"))
                .unwrap_or_default(),
            linked_versions,
            version_number: raw::int_or(raw, "version_number", 0),
            step: task.as_ref().and_then(|t| t.step.clone()),
            task: task.map(Box::new),
            description: raw::str_or_empty(raw, "description"),
            published_file_type: raw::nested_name(raw, "published_file_type"),
            category: raw::nested_name(raw, "sg_publish_category"),
            path_cache: raw::str_or_empty(raw, "path_cache_storage"),
            plate_name: raw::str_or_empty(raw, "sg_plate_name"),
        })
    }

    /// Version number zero-padded to `padding` digits.
    pub fn padded_version(&self, padding: usize) -> String {
        format!("{:0padding$}", self.version_number)
    }
}

impl std::fmt::Display for Publish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    use crate::entity::Entity;
    use crate::error::CoreError;
    use crate::search::PublishQuery;

    fn full_record() -> serde_json::Value {
        json!({
            "type": "PublishedFile",
            "id": 900,
            "code": "sh010_comp_v003.exr",
            "version_number": 3,
            "path": {"local_path_windows": "P:\\comet\\sh010\\comp\\v003\\sh010.####.exr"},
            "published_file_type": {"type": "PublishedFileType", "id": 2, "name": "Rendered Image"},
            "sg_publish_category": {"type": "CustomNonProjectEntity01", "id": 1, "name": "Final"},
            "sg_plate_name": "BG01",
            "description": "Final comp",
            "created_by": {"type": "HumanUser", "id": 4, "name": "Ada"},
            "created_at": "2024-04-10T16:30:00Z",
            "task": {
                "type": "Task",
                "id": 100,
                "content": "comp_main",
                "step": {"type": "Step", "id": 12, "code": "Comp"},
            },
            "version": {"type": "Version", "id": 700, "code": "sh010_comp_v003"},
        })
    }

    #[test]
    fn builds_nested_task_and_step() {
        let project = Project::new("Comet");
        let publish = Publish::build(&project, full_record().as_object().unwrap()).unwrap();
        assert_eq!(publish.version_number, 3);
        assert_eq!(publish.step.as_ref().map(|s| s.name.as_str()), Some("Comp"));
        assert_eq!(publish.task.as_ref().map(|t| t.base.name.as_str()), Some("comp_main"));
        assert_eq!(publish.published_file_type, "Rendered Image");
        assert_eq!(publish.category, "Final");
        assert_eq!(publish.plate_name, "BG01");
        assert!(publish.file_path.ends_with("sh010.####.exr"));
        assert_eq!(publish.linked_versions.len(), 1);
        assert_eq!(publish.base.created_by.as_ref().map(|u| u.id), Some(4));
        assert!(publish.base.date_created.is_some());
        assert_eq!(publish.base.sg_type, "PublishedFile");
    }

    #[test]
    fn sparse_record_defaults() {
        let project = Project::new("Comet");
        let raw = json!({"id": 901, "path": null, "published_file_type": null, "version_number": null});
        let publish = Publish::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(publish.version_number, 0);
        assert_eq!(publish.file_path, "");
        assert_eq!(publish.published_file_type, "");
        assert_eq!(publish.category, "");
        assert!(publish.step.is_none());
        assert!(publish.task.is_none());
        assert!(publish.linked_versions.is_empty());
    }

    #[test]
    fn padded_version() {
        let project = Project::new("Comet");
        let mut publish = Publish::new(&project, "p", 1);
        publish.version_number = 7;
        assert_eq!(publish.padded_version(3), "007");
        publish.version_number = 1234;
        assert_eq!(publish.padded_version(3), "1234");
    }

    #[test]
    fn searching_a_publish_for_publishes_is_rejected() {
        let project = Project::new("Comet");
        let publish = Publish::build(&project, full_record().as_object().unwrap()).unwrap();
        let entity = Entity::from(publish);
        assert_matches!(
            entity.publish_for_step(&PublishQuery::new("comp")),
            Err(CoreError::InvalidOperation(_))
        );
    }
}

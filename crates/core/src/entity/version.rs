use serde::Serialize;

use super::{EntityBase, EntityType, ParentRef, Publish, Task};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::search;
use crate::step::Step;
use crate::types::{DbId, RawRecord};

/// A reviewable version (render, playblast, ...).
#[derive(Debug, Clone, Serialize)]
pub struct Version {
    pub base: EntityBase,
    pub frames_resolution: String,
    pub first_frame: Option<i64>,
    pub last_frame: Option<i64>,
    pub frame_range: String,
    pub path_to_frames: String,
    pub path_to_movie: String,
    pub path_to_proxy: String,
    pub path_to_folder: String,
    pub path_to_geometry: String,
    pub linked_publishes: Vec<Publish>,
    pub step: Option<Step>,
    pub task: Option<Box<Task>>,
    pub status: String,
    pub stage: Option<String>,
}

impl Version {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::Version, name, id),
            frames_resolution: String::new(),
            first_frame: None,
            last_frame: None,
            frame_range: String::new(),
            path_to_frames: String::new(),
            path_to_movie: String::new(),
            path_to_proxy: String::new(),
            path_to_folder: String::new(),
            path_to_geometry: String::new(),
            linked_publishes: Vec::new(),
            step: None,
            task: None,
            status: String::new(),
            stage: None,
        }
    }

    /// Build a version from a raw `Version` record. The `entity` link, of any
    /// type, becomes the parent.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Version, raw)?;
        base.parent = raw::record(raw, "entity").map(ParentRef::from_raw).transpose()?;
        let task = raw::record(raw, "sg_task")
            .map(|r| Task::build(project, r))
            .transpose()?;

        Ok(Self {
            base,
            frames_resolution: raw::str_or_empty(raw, "sg_frames_resolution"),
            first_frame: raw::opt_int(raw, "sg_first_frame"),
            last_frame: raw::opt_int(raw, "sg_last_frame"),
            frame_range: raw::str_or_empty(raw, "frame_range"),
            path_to_frames: raw::str_or_empty(raw, "sg_path_to_frames"),
            path_to_movie: raw::str_or_empty(raw, "sg_path_to_movie"),
            path_to_proxy: raw::str_or_empty(raw, "sg_path_to_proxy"),
            path_to_folder: raw::str_or_empty(raw, "sg_path_to_folder"),
            path_to_geometry: raw::str_or_empty(raw, "sg_path_to_geometry"),
            linked_publishes: raw::records(raw, "published_files")
                .into_iter()
                .map(|r| Publish::build(project, r))
                .collect::<CoreResult<_>>()?,
            step: task.as_ref().and_then(|t| t.step.clone()),
            task: task.map(Box::new),
            status: raw::str_or_empty(raw, "sg_status_list"),
            stage: raw::opt_str(raw, "sg_stage"),
        })
    }

    /// Number read from the name suffix (`sh010_comp_v012` → 12), or 0.
    pub fn version_number(&self) -> i64 {
        search::version_sort_key(&self.base.name)
            .0
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_links_and_paths() {
        let project = Project::new("Comet");
        let raw = json!({
            "type": "Version",
            "id": 700,
            "code": "sh010_comp_v003",
            "entity": {"type": "Shot", "id": 5, "code": "SH010"},
            "sg_task": {"type": "Task", "id": 100, "content": "comp", "step": {"type": "Step", "id": 12, "code": "Comp"}},
            "published_files": [{"type": "PublishedFile", "id": 900, "code": "sh010_comp_v003.exr", "version_number": 3}],
            "sg_first_frame": 1001,
            "sg_last_frame": 1100,
            "frame_range": "1001-1100",
            "sg_path_to_movie": "/mnt/comet/sh010_comp_v003.mov",
            "sg_status_list": "rev",
        });
        let version = Version::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(version.version_number(), 3);
        assert_eq!(version.base.parent.as_ref().map(|p| p.entity_type), Some(EntityType::Shot));
        assert_eq!(version.step.as_ref().map(|s| s.name.as_str()), Some("Comp"));
        assert_eq!(version.linked_publishes.len(), 1);
        assert_eq!(version.first_frame, Some(1001));
        assert_eq!(version.frame_range, "1001-1100");
        assert_eq!(version.status, "rev");
    }

    #[test]
    fn unknown_parent_type_is_kept_by_reference() {
        let project = Project::new("Comet");
        let raw = json!({"id": 700, "entity": {"type": "CustomEntity05", "id": 3, "name": "Turntable"}});
        let version = Version::build(&project, raw.as_object().unwrap()).unwrap();
        let parent = version.base.parent.unwrap();
        assert_eq!(parent.entity_type, EntityType::Other);
        assert_eq!(parent.sg_type, "CustomEntity05");
    }

    #[test]
    fn sparse_record_defaults() {
        let project = Project::new("Comet");
        let raw = json!({"id": 700, "sg_first_frame": null, "published_files": []});
        let version = Version::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(version.version_number(), 0);
        assert_eq!(version.first_frame, None);
        assert_eq!(version.path_to_movie, "");
        assert!(version.linked_publishes.is_empty());
        assert!(version.base.parent.is_none());
    }
}

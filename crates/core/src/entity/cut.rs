use serde::Serialize;

use super::{EntityBase, EntityType, ParentRef};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// An edit of a sequence, scene or shot.
#[derive(Debug, Clone, Serialize)]
pub struct Cut {
    pub base: EntityBase,
    pub revision_number: Option<i64>,
    pub description: String,
    /// Cut item summaries, kept raw.
    pub cut_items: Vec<RawRecord>,
    pub duration: Option<i64>,
    pub fps: Option<f64>,
    pub status: String,
    pub cut_type: String,
}

impl Cut {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::Cut, name, id),
            revision_number: None,
            description: String::new(),
            cut_items: Vec::new(),
            duration: None,
            fps: None,
            status: String::new(),
            cut_type: String::new(),
        }
    }

    /// Build a cut from a raw `Cut` record. The `entity` link becomes the
    /// parent.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Cut, raw)?;
        base.parent = raw::record(raw, "entity").map(ParentRef::from_raw).transpose()?;
        Ok(Self {
            base,
            revision_number: raw::opt_int(raw, "revision_number"),
            description: raw::str_or_empty(raw, "description"),
            cut_items: raw::records(raw, "cut_items").into_iter().cloned().collect(),
            duration: raw::opt_int(raw, "duration"),
            fps: raw::opt_float(raw, "fps"),
            status: raw::str_or_empty(raw, "sg_status_list"),
            cut_type: raw::str_or_empty(raw, "sg_cut_type"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_parent_and_items() {
        let project = Project::new("Comet");
        let raw = json!({
            "type": "Cut",
            "id": 60,
            "code": "SQ01_edit",
            "entity": {"type": "Sequence", "id": 20, "code": "SQ01"},
            "cut_items": [{"type": "CutItem", "id": 1}, {"type": "CutItem", "id": 2}],
            "revision_number": 4,
            "fps": 24.0,
            "duration": 480,
            "sg_cut_type": "Editorial",
        });
        let cut = Cut::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(cut.base.parent.as_ref().map(|p| p.entity_type), Some(EntityType::Sequence));
        assert_eq!(cut.cut_items.len(), 2);
        assert_eq!(cut.revision_number, Some(4));
        assert_eq!(cut.fps, Some(24.0));
        assert_eq!(cut.duration, Some(480));
        assert_eq!(cut.cut_type, "Editorial");
    }

    #[test]
    fn sparse_record_defaults() {
        let project = Project::new("Comet");
        let raw = json!({"id": 60, "cut_items": null, "description": null});
        let cut = Cut::build(&project, raw.as_object().unwrap()).unwrap();
        assert!(cut.cut_items.is_empty());
        assert_eq!(cut.description, "");
        assert!(cut.base.parent.is_none());
        assert_eq!(cut.fps, None);
    }
}

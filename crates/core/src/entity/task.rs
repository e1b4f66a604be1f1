use serde::Serialize;

use super::{EntityBase, EntityType, ParentRef};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::step::Step;
use crate::types::{Date, DbId, RawRecord};
use crate::user::User;

/// A unit of work on a shot or asset, within a pipeline step.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub base: EntityBase,
    pub step: Option<Step>,
    pub status_code: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub stage: Option<String>,
    pub assigned_to: Vec<User>,
}

impl Task {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::Task, name, id),
            step: None,
            status_code: String::new(),
            start_date: None,
            end_date: None,
            stage: None,
            assigned_to: Vec::new(),
        }
    }

    /// Build a task from a raw `Task` record.
    ///
    /// The name comes from `content`, falling back to `name`. Only shot and
    /// asset links in `entity` become the parent.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::Task, raw)?;
        base.name = raw::opt_str(raw, "content")
            .or_else(|| raw::opt_str(raw, "name"))
            .unwrap_or_default();
        base.parent = match raw::record(raw, "entity") {
            Some(link) => {
                let parent = ParentRef::from_raw(link)?;
                match parent.entity_type {
                    EntityType::Shot | EntityType::Asset => Some(parent),
                    other => {
                        tracing::debug!(task = %base.name, parent_type = %other, "Ignoring task parent");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Self {
            base,
            step: raw::record(raw, "step").map(Step::build).transpose()?,
            status_code: raw::str_or_empty(raw, "sg_status_list"),
            start_date: raw::opt_date(raw, "start_date"),
            end_date: raw::opt_date(raw, "due_date"),
            stage: raw::opt_str(raw, "sg_stage"),
            assigned_to: raw::records(raw, "task_assignees")
                .into_iter()
                .map(User::build)
                .collect::<CoreResult<_>>()?,
        })
    }

    /// Whether `user` is among the assignees.
    pub fn is_assigned(&self, user: &User) -> bool {
        self.assigned_to.iter().any(|u| u.id == user.id)
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_step_and_assignees() {
        let project = Project::new("Comet");
        let raw = json!({
            "type": "Task",
            "id": 100,
            "content": "comp_main",
            "step": {"type": "Step", "id": 12, "code": "Comp", "short_name": "CMP"},
            "entity": {"type": "Shot", "id": 5, "code": "SH010"},
            "sg_status_list": "ip",
            "task_assignees": [{"type": "HumanUser", "id": 4, "name": "Ada", "firstname": "ada", "lastname": "l"}],
            "start_date": "2024-04-01",
            "due_date": "2024-04-12",
        });
        let task = Task::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(task.base.name, "comp_main");
        assert_eq!(task.step.as_ref().map(|s| s.short_name.as_str()), Some("CMP"));
        assert_eq!(task.base.parent.as_ref().map(|p| p.id), Some(5));
        assert_eq!(task.status_code, "ip");
        assert!(task.is_assigned(&task.assigned_to[0].clone()));
        assert_eq!(task.end_date, Date::from_ymd_opt(2024, 4, 12));
    }

    #[test]
    fn name_falls_back_to_name_field() {
        let project = Project::new("Comet");
        let raw = json!({"id": 100, "content": null, "name": "layout"});
        let task = Task::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(task.base.name, "layout");
    }

    #[test]
    fn defaults_when_sparse() {
        let project = Project::new("Comet");
        let raw = json!({"id": 100});
        let task = Task::build(&project, raw.as_object().unwrap()).unwrap();
        assert_eq!(task.base.name, "");
        assert!(task.step.is_none());
        assert_eq!(task.status_code, "");
        assert!(task.assigned_to.is_empty());
        assert!(task.base.parent.is_none());
    }

    #[test]
    fn non_shot_parent_ignored() {
        let project = Project::new("Comet");
        let raw = json!({"id": 100, "entity": {"type": "Sequence", "id": 20, "code": "SQ01"}});
        let task = Task::build(&project, raw.as_object().unwrap()).unwrap();
        assert!(task.base.parent.is_none());
    }
}

//! People and notes.

use serde::Serialize;

use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::types::{DbId, RawRecord};

/// Mail domain used when a user record carries no email address.
pub const DEFAULT_EMAIL_DOMAIN: &str = "fxquinox.studio";

/// A tracking-system user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub id: DbId,
    pub email: String,
    pub permission_level: String,
    pub assigned_projects: Vec<ProjectSummary>,
    #[serde(skip)]
    pub raw: RawRecord,
}

/// Name and id of a project a user is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub id: DbId,
}

impl User {
    /// Create a user. Empty `login` and `email` are derived from the name
    /// parts as `first.last` and `first.last@DEFAULT_EMAIL_DOMAIN`.
    pub fn new(
        name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        login: impl Into<String>,
        id: DbId,
        email: impl Into<String>,
    ) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let mut login = login.into();
        if login.is_empty() {
            login = format!("{first_name}.{last_name}");
        }
        let mut email = email.into();
        if email.is_empty() {
            email = format!("{first_name}.{last_name}@{DEFAULT_EMAIL_DOMAIN}");
        }
        Self {
            name: name.into(),
            first_name,
            last_name,
            login,
            id,
            email,
            ..Default::default()
        }
    }

    /// Build a user from a full `HumanUser` record. `id` is mandatory.
    pub fn build(raw: &RawRecord) -> CoreResult<Self> {
        let id = raw::required_id(raw, "User")?;
        let mut user = Self::from_parts(raw, id);
        user.permission_level = raw::nested_name(raw, "permission_rule_set");
        user.assigned_projects = raw::records(raw, "projects")
            .into_iter()
            .map(|project| -> CoreResult<ProjectSummary> {
                Ok(ProjectSummary {
                    name: raw::entity_name(project),
                    id: raw::required_id(project, "Project")?,
                })
            })
            .collect::<CoreResult<_>>()?;
        Ok(user)
    }

    /// Build a user from an entity summary such as `created_by`, which only
    /// carries `type`, `id` and `name`. Never fails; a missing id reads as 0.
    pub fn from_summary(raw: &RawRecord) -> Self {
        let id = raw::opt_int(raw, "id").unwrap_or_default();
        Self::from_parts(raw, id)
    }

    fn from_parts(raw: &RawRecord, id: DbId) -> Self {
        let mut user = Self::new(
            raw::str_or_empty(raw, "name"),
            raw::str_or_empty(raw, "firstname"),
            raw::str_or_empty(raw, "lastname"),
            raw::str_or_empty(raw, "login"),
            id,
            raw::str_or_empty(raw, "email"),
        );
        user.raw = raw.clone();
        user
    }

    /// Whether this user is assigned to `project`.
    pub fn is_assigned_to(&self, project: &Project) -> bool {
        self.assigned_projects.iter().any(|p| p.id == project.id)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A review or production note attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Note {
    pub id: DbId,
    pub subject: String,
    pub body: String,
    pub from_user: Option<User>,
    pub to_users: Vec<User>,
}

impl Note {
    /// Build a note from a `Note` record or summary. Notes attached to other
    /// entities arrive as summaries, so nothing here is mandatory.
    pub fn build(raw: &RawRecord) -> Self {
        Self {
            id: raw::opt_int(raw, "id").unwrap_or_default(),
            subject: raw::opt_str(raw, "subject").unwrap_or_else(|| raw::entity_name(raw)),
            body: raw::str_or_empty(raw, "content"),
            from_user: raw::record(raw, "user").map(User::from_summary),
            to_users: raw::records(raw, "addressings_to")
                .into_iter()
                .map(User::from_summary)
                .collect(),
        }
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject)
    }
}

//! Step/task lookups over an entity's publishes and versions.
//!
//! Matching rules shared by both searches:
//!
//! - With a task name, an entry matches when its step name equals the
//!   requested step **and** its task name equals the requested task.
//! - Without one, an entry matches when either its step name **or** its task
//!   name equals the requested step.
//! - Comparisons ignore case. An entry missing its step or task never
//!   matches on the missing side.
//! - Candidates are visited latest version first; the first match wins.
//!
//! A miss is not an error: the public lookups log a warning and return
//! `None`.

use std::cmp::Reverse;

use crate::entity::{EntityBase, EntityType, Publish, Task, Version};
use crate::error::{CoreError, CoreResult};
use crate::step::Step;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Parameters for [`publish_for_step`].
///
/// The type, category and plate filters are alternatives: a publish is
/// considered when **any** supplied filter matches it. With no filter
/// supplied every publish is considered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PublishQuery<'a> {
    pub step: &'a str,
    pub task_name: Option<&'a str>,
    /// Exact published-file-type name, e.g. `"Alembic Cache"`.
    pub file_type: Option<&'a str>,
    /// Exact publish category name.
    pub category: Option<&'a str>,
    /// A specific version number; `None` means latest.
    pub version: Option<i64>,
    /// Plate name, compared case-insensitively.
    pub plate: Option<&'a str>,
}

impl<'a> PublishQuery<'a> {
    pub fn new(step: &'a str) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    pub fn task(mut self, task_name: &'a str) -> Self {
        self.task_name = Some(task_name);
        self
    }

    pub fn file_type(mut self, file_type: &'a str) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn category(mut self, category: &'a str) -> Self {
        self.category = Some(category);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn plate(mut self, plate: &'a str) -> Self {
        self.plate = Some(plate);
        self
    }

    fn has_type_filter(&self) -> bool {
        self.file_type.is_some() || self.category.is_some() || self.plate.is_some_and(|p| !p.is_empty())
    }
}

/// Parameters for [`version_for_step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VersionQuery<'a> {
    pub step: &'a str,
    pub task_name: Option<&'a str>,
    pub version: Option<i64>,
}

impl<'a> VersionQuery<'a> {
    pub fn new(step: &'a str) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    pub fn task(mut self, task_name: &'a str) -> Self {
        self.task_name = Some(task_name);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }
}

// ---------------------------------------------------------------------------
// Step-linked entries
// ---------------------------------------------------------------------------

/// An entry that records which step and task produced it.
pub(crate) trait StepLinked {
    fn step(&self) -> Option<&Step>;
    fn task(&self) -> Option<&Task>;
    fn version_number(&self) -> i64;
}

impl StepLinked for Publish {
    fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    fn task(&self) -> Option<&Task> {
        self.task.as_deref()
    }

    fn version_number(&self) -> i64 {
        self.version_number
    }
}

impl StepLinked for Version {
    fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    fn task(&self) -> Option<&Task> {
        self.task.as_deref()
    }

    fn version_number(&self) -> i64 {
        Version::version_number(self)
    }
}

fn names_match(actual: Option<&str>, wanted: &str) -> bool {
    actual.is_some_and(|name| name.to_lowercase() == wanted)
}

/// First candidate (in iteration order) produced by `step`/`task`.
pub(crate) fn find_for_step<'e, T: StepLinked + 'e>(
    candidates: impl IntoIterator<Item = &'e T>,
    step: &str,
    task_name: Option<&str>,
    version: Option<i64>,
) -> Option<&'e T> {
    let step = step.to_lowercase();
    let task = task_name.filter(|t| !t.is_empty()).map(str::to_lowercase);
    let version = version.filter(|v| *v != 0);

    candidates.into_iter().find(|entry| {
        if version.is_some_and(|v| entry.version_number() != v) {
            return false;
        }
        let step_name = entry.step().map(|s| s.name.as_str());
        let task_entry_name = entry.task().map(|t| t.base.name.as_str());
        match &task {
            Some(task) => names_match(step_name, &step) && names_match(task_entry_name, task),
            None => names_match(step_name, &step) || names_match(task_entry_name, &step),
        }
    })
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort publishes by `version_number`, highest first. Ties keep their order.
pub fn sort_publishes(publishes: &mut [Publish]) {
    publishes.sort_by_key(|p| Reverse(p.version_number));
}

/// Sort key for a version name: the text after the last underscore,
/// lowercased, with its last run of digits read as a number.
///
/// `sh010_comp_v012` → `(Some(12), "v012")`, `sh010_comp_v2b3` →
/// `(Some(3), "v2b3")`. Suffixes without digits sort below numbered ones.
pub fn version_sort_key(name: &str) -> (Option<u64>, String) {
    let suffix = name.rsplit('_').next().unwrap_or_default().to_lowercase();
    let through_digits = suffix.trim_end_matches(|c: char| !c.is_ascii_digit());
    let start = through_digits.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let number = through_digits[start..].parse().ok();
    (number, suffix)
}

/// Sort versions by [`version_sort_key`], highest first.
pub fn sort_versions(versions: &mut [Version]) {
    versions.sort_by_cached_key(|v| Reverse(version_sort_key(&v.base.name)));
}

// ---------------------------------------------------------------------------
// Publish lookup
// ---------------------------------------------------------------------------

/// Publishes passing the query's type/category/plate filters.
pub fn filter_publishes<'p>(publishes: &'p [Publish], query: &PublishQuery<'_>) -> Vec<&'p Publish> {
    if !query.has_type_filter() {
        return publishes.iter().collect();
    }
    let plate = query.plate.filter(|p| !p.is_empty()).map(str::to_lowercase);
    publishes
        .iter()
        .filter(|publish| {
            query.file_type.is_some_and(|t| publish.published_file_type == t)
                || query.category.is_some_and(|c| publish.category == c)
                || plate
                    .as_deref()
                    .is_some_and(|p| publish.plate_name.to_lowercase() == p)
        })
        .collect()
}

/// Quiet publish search used by the public lookups and LOD scan.
pub(crate) fn find_publish<'p>(publishes: &'p [Publish], query: &PublishQuery<'_>) -> Option<&'p Publish> {
    let mut candidates = filter_publishes(publishes, query);
    candidates.sort_by_key(|p| Reverse(p.version_number));
    find_for_step(candidates, query.step, query.task_name, query.version)
}

/// Latest (or a specific version of the) publish for a step on `owner`.
///
/// Publishes do not own publishes, so an `owner` that is itself a publish
/// is a [`CoreError::InvalidOperation`] whatever the query.
pub fn publish_for_step<'b>(
    owner: &'b EntityBase,
    query: &PublishQuery<'_>,
) -> CoreResult<Option<&'b Publish>> {
    if owner.entity_type == EntityType::Publish {
        return Err(CoreError::InvalidOperation(format!(
            "cannot look up publishes of publish '{}'",
            owner.name
        )));
    }
    Ok(logged_publish_for_step(owner, query))
}

/// [`publish_for_step`] for owners known not to be publishes.
pub(crate) fn logged_publish_for_step<'b>(
    owner: &'b EntityBase,
    query: &PublishQuery<'_>,
) -> Option<&'b Publish> {
    if query.has_type_filter() && filter_publishes(&owner.publishes, query).is_empty() {
        tracing::warn!(
            entity_type = %owner.entity_type,
            entity = %owner.name,
            file_type = ?query.file_type,
            category = ?query.category,
            plate = ?query.plate,
            "No publishes of the requested type",
        );
    }
    let found = find_publish(&owner.publishes, query);
    if found.is_none() {
        tracing::warn!(
            entity = %owner.name,
            step = query.step,
            task = ?query.task_name,
            file_type = ?query.file_type,
            version = ?query.version,
            "No publish match found",
        );
    }
    found
}

// ---------------------------------------------------------------------------
// Version lookup
// ---------------------------------------------------------------------------

/// Latest (or a specific) version for a step on `owner`.
pub fn version_for_step<'b>(owner: &'b EntityBase, query: &VersionQuery<'_>) -> Option<&'b Version> {
    let mut candidates: Vec<&Version> = owner.versions.iter().collect();
    candidates.sort_by_cached_key(|v| Reverse(version_sort_key(&v.base.name)));
    let found = find_for_step(candidates, query.step, query.task_name, query.version);
    if found.is_none() {
        tracing::warn!(
            entity = %owner.name,
            step = query.step,
            task = ?query.task_name,
            version = ?query.version,
            "No version found",
        );
    }
    found
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::project::Project;

    fn task(project: &Project, name: &str, step: &str) -> Task {
        let mut task = Task::new(project, name, 0);
        task.step = Some(Step::new(step, 0));
        task
    }

    fn publish(project: &Project, version: i64, step: &str, task_name: &str) -> Publish {
        let mut p = Publish::new(project, format!("pub_v{version:03}"), version);
        p.version_number = version;
        let t = task(project, task_name, step);
        p.step = t.step.clone();
        p.task = Some(Box::new(t));
        p
    }

    fn version(project: &Project, name: &str, step: &str, task_name: &str) -> Version {
        let mut v = Version::new(project, name, 0);
        let t = task(project, task_name, step);
        v.step = t.step.clone();
        v.task = Some(Box::new(t));
        v
    }

    fn owner(project: &Project) -> EntityBase {
        EntityBase::new(project, EntityType::Shot, "SH010", 1)
    }

    fn lookup<'b>(base: &'b EntityBase, query: &PublishQuery<'_>) -> Option<&'b Publish> {
        publish_for_step(base, query).unwrap()
    }

    // -- sorting ------------------------------------------------------------

    #[test]
    fn publishes_sort_latest_first() {
        let project = Project::new("Comet");
        let mut list = vec![
            publish(&project, 1, "Comp", "comp"),
            publish(&project, 3, "Comp", "comp"),
            publish(&project, 2, "Comp", "comp"),
        ];
        sort_publishes(&mut list);
        let order: Vec<i64> = list.iter().map(|p| p.version_number).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn version_key_reads_suffix_digits() {
        assert_eq!(version_sort_key("sh010_comp_v012"), (Some(12), "v012".to_string()));
        assert_eq!(version_sort_key("SH010_Comp_V3"), (Some(3), "v3".to_string()));
        assert_eq!(version_sort_key("nosuffix"), (None, "nosuffix".to_string()));
    }

    #[test]
    fn version_key_uses_last_digit_run() {
        assert_eq!(version_sort_key("sh010_comp_v2b3"), (Some(3), "v2b3".to_string()));
        assert_eq!(version_sort_key("sh010_comp_v12a"), (Some(12), "v12a".to_string()));
    }

    #[test]
    fn versions_sort_numerically_not_lexically() {
        let project = Project::new("Comet");
        let mut list = vec![
            version(&project, "sh010_comp_v9", "Comp", "comp"),
            version(&project, "sh010_comp_v10", "Comp", "comp"),
            version(&project, "SH010_COMP_V2", "Comp", "comp"),
        ];
        sort_versions(&mut list);
        let order: Vec<&str> = list.iter().map(|v| v.base.name.as_str()).collect();
        assert_eq!(order, vec!["sh010_comp_v10", "sh010_comp_v9", "SH010_COMP_V2"]);
    }

    // -- publish_for_step ---------------------------------------------------

    #[test]
    fn returns_latest_for_step() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.publishes = vec![
            publish(&project, 1, "Comp", "comp"),
            publish(&project, 4, "Comp", "comp"),
            publish(&project, 2, "Light", "light"),
        ];
        let found = lookup(&base, &PublishQuery::new("comp")).unwrap();
        assert_eq!(found.version_number, 4);
    }

    #[test]
    fn task_name_requires_both_to_match() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.publishes = vec![
            publish(&project, 5, "Comp", "precomp"),
            publish(&project, 3, "Comp", "Comp_Main"),
        ];
        let found = lookup(&base, &PublishQuery::new("COMP").task("comp_main")).unwrap();
        assert_eq!(found.version_number, 3);

        assert!(lookup(&base, &PublishQuery::new("Light").task("comp_main")).is_none());
    }

    #[test]
    fn without_task_name_step_or_task_may_match() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.publishes = vec![publish(&project, 2, "Lighting", "relight")];
        let by_task = lookup(&base, &PublishQuery::new("ReLight")).unwrap();
        assert_eq!(by_task.version_number, 2);
        let by_step = lookup(&base, &PublishQuery::new("lighting")).unwrap();
        assert_eq!(by_step.version_number, 2);
    }

    #[test]
    fn specific_version_is_honoured() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.publishes = vec![
            publish(&project, 1, "Comp", "comp"),
            publish(&project, 2, "Comp", "comp"),
            publish(&project, 3, "Comp", "comp"),
        ];
        let found = lookup(&base, &PublishQuery::new("comp").version(2)).unwrap();
        assert_eq!(found.version_number, 2);
        assert!(lookup(&base, &PublishQuery::new("comp").version(9)).is_none());
    }

    #[test]
    fn type_filters_are_alternatives() {
        let project = Project::new("Comet");
        let mut cache = publish(&project, 1, "Anim", "anim");
        cache.published_file_type = "Alembic Cache".into();
        let mut plate = publish(&project, 2, "Anim", "anim");
        plate.published_file_type = "Image Sequence".into();
        plate.plate_name = "BG01".into();
        let mut other = publish(&project, 3, "Anim", "anim");
        other.published_file_type = "Maya Scene".into();

        let list = vec![cache, plate, other];
        let query = PublishQuery::new("anim").file_type("Alembic Cache").plate("bg01");
        let kept: Vec<i64> = filter_publishes(&list, &query)
            .iter()
            .map(|p| p.version_number)
            .collect();
        assert_eq!(kept, vec![1, 2]);

        let mut base = owner(&project);
        base.publishes = list;
        assert_eq!(lookup(&base, &query).unwrap().version_number, 2);
    }

    #[test]
    fn category_filter() {
        let project = Project::new("Comet");
        let mut a = publish(&project, 1, "Comp", "comp");
        a.category = "Review".into();
        let b = publish(&project, 2, "Comp", "comp");
        let mut base = owner(&project);
        base.publishes = vec![a, b];
        let found = lookup(&base, &PublishQuery::new("comp").category("Review")).unwrap();
        assert_eq!(found.version_number, 1);
    }

    #[test]
    fn entries_without_task_are_skipped() {
        let project = Project::new("Comet");
        let mut orphan = Publish::new(&project, "orphan", 0);
        orphan.version_number = 9;
        let mut base = owner(&project);
        base.publishes = vec![orphan, publish(&project, 1, "Comp", "comp")];
        let found = lookup(&base, &PublishQuery::new("comp")).unwrap();
        assert_eq!(found.version_number, 1);
    }

    #[test]
    fn empty_task_name_means_no_task_filter() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.publishes = vec![publish(&project, 1, "Comp", "slapcomp")];
        assert!(lookup(&base, &PublishQuery::new("comp").task("")).is_some());
    }

    #[test]
    fn publish_owner_is_rejected() {
        let project = Project::new("Comet");
        let mut base = EntityBase::new(&project, EntityType::Publish, "sh010_comp_v001", 7);
        base.publishes = vec![publish(&project, 1, "Comp", "comp")];
        for query in [PublishQuery::new("comp"), PublishQuery::new("comp").task("comp")] {
            assert_matches!(publish_for_step(&base, &query), Err(CoreError::InvalidOperation(_)));
        }
    }

    // -- version_for_step ---------------------------------------------------

    #[test]
    fn version_lookup_returns_highest_suffix() {
        let project = Project::new("Comet");
        let mut base = owner(&project);
        base.versions = vec![
            version(&project, "sh010_comp_v002", "Comp", "comp"),
            version(&project, "sh010_comp_v010", "Comp", "comp"),
            version(&project, "sh010_light_v020", "Light", "light"),
        ];
        let found = version_for_step(&base, &VersionQuery::new("comp")).unwrap();
        assert_eq!(found.base.name, "sh010_comp_v010");

        let pinned = version_for_step(&base, &VersionQuery::new("comp").version(2)).unwrap();
        assert_eq!(pinned.base.name, "sh010_comp_v002");
    }

    #[test]
    fn version_lookup_miss_is_none() {
        let project = Project::new("Comet");
        let base = owner(&project);
        assert!(version_for_step(&base, &VersionQuery::new("comp").task("comp")).is_none());
    }
}

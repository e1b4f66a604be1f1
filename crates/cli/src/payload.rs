//! Loading payload files and turning them into entities.
//!
//! A payload file holds one record or an array of records. Each record may
//! nest its children under `publishes` and `versions`; those are built and
//! attached to the owning entity so the searches have something to look at.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use fxquinox_core::types::RawRecord;
use fxquinox_core::{raw, CoreResult, Entity, Project, Publish, Version};

/// Read `path` as a single record or an array of records.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("payload {} is not valid JSON", path.display()))?;

    match value {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                _ => bail!("payload {} item {index} is not an object", path.display()),
            })
            .collect(),
        _ => bail!("payload {} must be an object or an array", path.display()),
    }
}

/// Load the owning project, or an empty one when no file is given.
pub fn load_project(path: Option<&Path>) -> anyhow::Result<Project> {
    let Some(path) = path else {
        tracing::debug!("No project file given, using an empty project");
        return Ok(Project::new(""));
    };
    let mut records = load_records(path)?;
    if records.len() != 1 {
        bail!("project file {} must hold exactly one record", path.display());
    }
    let record = records.remove(0);
    Project::build(&record).with_context(|| format!("invalid project in {}", path.display()))
}

/// Build every record, attaching nested children. Records of kinds with no
/// entity representation are skipped.
pub fn build_entities(project: &Project, records: &[RawRecord]) -> anyhow::Result<Vec<Entity>> {
    let mut entities = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let Some(mut entity) = Entity::build(project, record)
            .with_context(|| format!("record {index} could not be built"))?
        else {
            tracing::info!(index, sg_type = %raw::str_or_empty(record, "type"), "Skipping record");
            continue;
        };
        attach_children(project, &mut entity, record)
            .with_context(|| format!("children of record {index} could not be built"))?;
        entities.push(entity);
    }
    tracing::debug!(count = entities.len(), "Built entities");
    Ok(entities)
}

/// Fill the entity's publish and version lists from the nested keys. Lists
/// the kind already populated itself (playlists read `versions`) are left
/// alone.
fn attach_children(project: &Project, entity: &mut Entity, record: &RawRecord) -> CoreResult<()> {
    let base = entity.base_mut();
    if base.publishes.is_empty() {
        base.publishes = raw::records(record, "publishes")
            .into_iter()
            .map(|r| Publish::build(project, r))
            .collect::<CoreResult<_>>()?;
    }
    if base.versions.is_empty() {
        base.versions = raw::records(record, "versions")
            .into_iter()
            .map(|r| Version::build(project, r))
            .collect::<CoreResult<_>>()?;
    }
    Ok(())
}

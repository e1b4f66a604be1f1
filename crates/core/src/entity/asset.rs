use serde::Serialize;

use super::{EntityBase, EntityType, ParentRef, Publish, Shot};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::search::{self, PublishQuery};
use crate::types::{DbId, RawRecord};

/// Letters appended to a task name to mark increasing levels of detail.
pub const LOD_SUFFIXES: std::ops::RangeInclusive<char> = 'A'..='Z';

/// A build asset (character, prop, set, ...).
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub base: EntityBase,
    /// Asset type, e.g. `Character`.
    pub subtype: String,
    /// Set when the subtype names a template.
    pub is_template: bool,
    /// Frame range, used by animation cycles.
    pub cut_in: i64,
    pub cut_out: i64,
}

impl Asset {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId, asset_type: impl Into<String>) -> Self {
        let subtype = asset_type.into();
        let mut base = EntityBase::new(project, EntityType::Asset, name, id);
        base.parent = Some(ParentRef::project(project));
        Self {
            base,
            is_template: subtype.to_lowercase().contains("template"),
            subtype,
            cut_in: 0,
            cut_out: 0,
        }
    }

    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let base = EntityBase::from_raw(project, EntityType::Asset, raw)?;
        let mut asset = Self::new(project, base.name.clone(), base.id, raw::str_or_empty(raw, "sg_asset_type"));
        let parent = asset.base.parent.take();
        asset.base = base;
        asset.base.parent = parent;
        Ok(asset)
    }

    /// Publish of the highest level of detail for a task family.
    ///
    /// Tries `task_basename` + `A`..`Z` in order and keeps the last hit.
    /// Without any lettered hit, falls back to `task_basename` itself.
    pub fn highest_lod(&self, step: &str, task_basename: &str) -> Option<&Publish> {
        let mut highest = None;
        for letter in LOD_SUFFIXES {
            let task_name = format!("{task_basename}{letter}");
            let query = PublishQuery::new(step).task(&task_name);
            if let Some(found) = search::find_publish(&self.base.publishes, &query) {
                highest = Some(found);
            }
        }
        if highest.is_some() {
            return highest;
        }
        search::logged_publish_for_step(&self.base, &PublishQuery::new(step).task(task_basename))
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

/// An asset placed in a shot.
#[derive(Debug, Clone, Serialize)]
pub struct AssetInstance {
    pub base: EntityBase,
    pub status: String,
    pub shot: Option<Box<Shot>>,
    pub asset: Option<Box<Asset>>,
    pub index: Option<i64>,
    pub active: bool,
}

impl AssetInstance {
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        Self {
            base: EntityBase::new(project, EntityType::AssetInstance, name, id),
            status: String::new(),
            shot: None,
            asset: None,
            index: None,
            active: false,
        }
    }

    /// Build from a raw `AssetInstance` record; the owning shot becomes the
    /// parent.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let mut base = EntityBase::from_raw(project, EntityType::AssetInstance, raw)?;
        let shot = raw::record(raw, "sg_shot")
            .map(|r| Shot::build(project, r))
            .transpose()?;
        let asset = raw::record(raw, "sg_asset")
            .map(|r| Asset::build(project, r))
            .transpose()?;
        base.parent = shot.as_ref().map(|s| s.base.as_parent());
        Ok(Self {
            base,
            status: raw::str_or_empty(raw, "sg_status_list"),
            shot: shot.map(Box::new),
            asset: asset.map(Box::new),
            index: raw.get("sg_index").and_then(raw::value_as_int),
            active: raw::flag(raw, "sg_active"),
        })
    }
}

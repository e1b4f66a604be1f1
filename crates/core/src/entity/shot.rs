//! Shots and their edit ranges.
//!
//! A shot stores its cut range plus per-side handle and roll counts. The
//! handle/roll cut points and durations are computed on every read from
//! those inputs, so they cannot drift when an input changes.

use serde::Serialize;

use super::{Asset, EntityBase, EntityType, Episode, ParentRef, Publish, Sequence, ALEMBIC_CACHE_TYPE};
use crate::error::CoreResult;
use crate::project::Project;
use crate::raw;
use crate::search;
use crate::types::{DbId, RawRecord};

/// Handle count that means "use the project default".
const UNSET_HANDLE_COUNT: i64 = 1;

/// Client cut-out used when only the client cut-in is set.
const UNSET_CLIENT_CUT_OUT: i64 = 1;

/// Edit inputs for a shot, as stored on the tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRange {
    pub cut_in: i64,
    pub cut_out: i64,
    /// Client-facing cut range; mirrors the shot cut range when the cut-in
    /// is unset. A set cut-in with no cut-out reads the cut-out as 1.
    pub client_cut_in: Option<i64>,
    pub client_cut_out: Option<i64>,
    /// Per-shot handle counts. A count of exactly 1 defers to the project's
    /// `sg_handles_in` / `sg_handles_out` when the project sets one.
    pub handle_count_in: i64,
    pub handle_count_out: i64,
    pub roll_count_in: i64,
    pub roll_count_out: i64,
}

impl Default for EditRange {
    fn default() -> Self {
        Self {
            cut_in: 0,
            cut_out: 0,
            client_cut_in: None,
            client_cut_out: None,
            handle_count_in: UNSET_HANDLE_COUNT,
            handle_count_out: UNSET_HANDLE_COUNT,
            roll_count_in: 0,
            roll_count_out: 0,
        }
    }
}

impl EditRange {
    /// Read the edit fields of a raw `Shot` record.
    ///
    /// Unset (missing, null or zero) handle and roll counts read as 1.
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            cut_in: raw::int_or(raw, "sg_cut_in", 0),
            cut_out: raw::int_or(raw, "sg_cut_out", 0),
            client_cut_in: raw::opt_int(raw, "sg_client_cut_in"),
            client_cut_out: raw::opt_int(raw, "sg_client_cut_out"),
            handle_count_in: raw::int_or(raw, "sg_handle_count_in", UNSET_HANDLE_COUNT),
            handle_count_out: raw::int_or(raw, "sg_handle_count_out", UNSET_HANDLE_COUNT),
            roll_count_in: raw::int_or(raw, "sg_roll_count_in", 1),
            roll_count_out: raw::int_or(raw, "sg_roll_count_out", 1),
        }
    }
}

/// Derived frame numbers of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShotFrames {
    pub cut_in: i64,
    pub cut_out: i64,
    pub handle_in: i64,
    pub handle_out: i64,
    pub handle_cut_in: i64,
    pub handle_cut_out: i64,
    pub roll_cut_in: i64,
    pub roll_cut_out: i64,
    pub cut_duration: i64,
    pub handle_duration: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shot {
    pub base: EntityBase,
    pub sequence: Option<Box<Sequence>>,
    pub episode: Option<Box<Episode>>,
    pub assets: Vec<Asset>,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub client_name: String,

    cut_in: i64,
    cut_out: i64,
    client_cut_in: i64,
    client_cut_out: i64,
    handle_in: i64,
    handle_out: i64,
    roll_count_in: i64,
    roll_count_out: i64,
}

impl Shot {
    /// A shot with a default edit range, resolved against `project`.
    pub fn new(project: &Project, name: impl Into<String>, id: DbId) -> Self {
        let mut shot = Self {
            base: EntityBase::new(project, EntityType::Shot, name, id),
            sequence: None,
            episode: None,
            assets: Vec::new(),
            status: None,
            stage: None,
            client_name: String::new(),
            cut_in: 0,
            cut_out: 0,
            client_cut_in: 0,
            client_cut_out: 0,
            handle_in: 0,
            handle_out: 0,
            roll_count_in: 0,
            roll_count_out: 0,
        };
        shot.set_edit_range(project, EditRange::default());
        shot
    }

    /// Build a shot from a raw `Shot` record.
    ///
    /// Embedded `sg_sequence` / `sg_episode` records are built too; when
    /// both are present the sequence becomes the parent.
    pub fn build(project: &Project, raw: &RawRecord) -> CoreResult<Self> {
        let base = EntityBase::from_raw(project, EntityType::Shot, raw)?;
        let sequence = raw::record(raw, "sg_sequence")
            .map(|r| Sequence::build(project, r))
            .transpose()?;
        let episode = raw::record(raw, "sg_episode")
            .map(|r| Episode::build(project, r))
            .transpose()?;
        let assets = raw::records(raw, "assets")
            .into_iter()
            .map(|r| Asset::build(project, r))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut shot = Self::new(project, base.name.clone(), base.id);
        shot.base = base;
        shot.base.parent = Self::resolve_parent(sequence.as_ref(), episode.as_ref());
        shot.sequence = sequence.map(Box::new);
        shot.episode = episode.map(Box::new);
        shot.assets = assets;
        shot.client_name = raw::str_or_empty(raw, "sg_client_shot_name");
        shot.status = raw::opt_str(raw, "sg_status_list");
        shot.stage = raw::opt_str(raw, "sg_stage");
        shot.set_edit_range(project, EditRange::from_raw(raw));
        Ok(shot)
    }

    fn resolve_parent(sequence: Option<&Sequence>, episode: Option<&Episode>) -> Option<ParentRef> {
        match (sequence, episode) {
            (Some(sequence), _) => Some(sequence.base.as_parent()),
            (None, Some(episode)) => Some(episode.base.as_parent()),
            (None, None) => None,
        }
    }

    /// Replace the edit inputs, resolving unset handle counts against the
    /// project defaults.
    pub fn set_edit_range(&mut self, project: &Project, range: EditRange) {
        self.cut_in = range.cut_in;
        self.cut_out = range.cut_out;

        match range.client_cut_in {
            Some(client_in) => {
                self.client_cut_in = client_in;
                self.client_cut_out = range.client_cut_out.unwrap_or(UNSET_CLIENT_CUT_OUT);
            }
            None => {
                self.client_cut_in = range.cut_in;
                self.client_cut_out = range.cut_out;
            }
        }

        self.handle_in = resolve_handle(range.handle_count_in, project.handles_in);
        self.handle_out = resolve_handle(range.handle_count_out, project.handles_out);
        self.roll_count_in = range.roll_count_in;
        self.roll_count_out = range.roll_count_out;
    }

    pub fn cut_in(&self) -> i64 {
        self.cut_in
    }

    pub fn cut_out(&self) -> i64 {
        self.cut_out
    }

    pub fn client_cut_in(&self) -> i64 {
        self.client_cut_in
    }

    pub fn client_cut_out(&self) -> i64 {
        self.client_cut_out
    }

    pub fn handle_in(&self) -> i64 {
        self.handle_in
    }

    pub fn handle_out(&self) -> i64 {
        self.handle_out
    }

    pub fn roll_count_in(&self) -> i64 {
        self.roll_count_in
    }

    pub fn roll_count_out(&self) -> i64 {
        self.roll_count_out
    }

    pub fn handle_cut_in(&self) -> i64 {
        self.cut_in - self.handle_in
    }

    pub fn handle_cut_out(&self) -> i64 {
        self.cut_out + self.handle_out
    }

    pub fn roll_cut_in(&self) -> i64 {
        self.handle_cut_in() - self.roll_count_in
    }

    pub fn roll_cut_out(&self) -> i64 {
        self.handle_cut_out() + self.roll_count_out
    }

    /// Frames in the cut, inclusive.
    pub fn cut_duration(&self) -> i64 {
        self.cut_out - self.cut_in + 1
    }

    /// Frames including handles, inclusive.
    pub fn handle_duration(&self) -> i64 {
        self.handle_cut_out() - self.handle_cut_in() + 1
    }

    pub fn frames(&self) -> ShotFrames {
        ShotFrames {
            cut_in: self.cut_in,
            cut_out: self.cut_out,
            handle_in: self.handle_in,
            handle_out: self.handle_out,
            handle_cut_in: self.handle_cut_in(),
            handle_cut_out: self.handle_cut_out(),
            roll_cut_in: self.roll_cut_in(),
            roll_cut_out: self.roll_cut_out(),
            cut_duration: self.cut_duration(),
            handle_duration: self.handle_duration(),
        }
    }

    /// Latest Alembic cache publish whose name contains `cache_name`, for a
    /// step and optional task.
    pub fn latest_publish_cache_for_step(
        &self,
        cache_name: &str,
        step: &str,
        task_name: Option<&str>,
    ) -> Option<&Publish> {
        let mut caches: Vec<&Publish> = self
            .base
            .publishes
            .iter()
            .filter(|p| p.published_file_type == ALEMBIC_CACHE_TYPE && p.base.name.contains(cache_name))
            .collect();
        caches.sort_by_key(|p| std::cmp::Reverse(p.version_number));
        let found = search::find_for_step(caches, step, task_name, None);
        if found.is_none() {
            tracing::warn!(shot = %self.base.name, cache = cache_name, step, "Publish not found for cache");
        }
        found
    }
}

fn resolve_handle(count: i64, project_default: Option<i64>) -> i64 {
    match project_default {
        Some(default) if default != 0 && count == UNSET_HANDLE_COUNT => {
            tracing::debug!(count, default, "Using project handle default");
            default
        }
        _ => count,
    }
}

impl std::fmt::Display for Shot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base.name)
    }
}

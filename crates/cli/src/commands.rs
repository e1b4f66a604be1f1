//! Subcommand implementations.
//!
//! Each command loads its payload, runs the lookup on every entity and
//! writes one line per entity (text) or a single JSON document.

use std::io::Write;

use anyhow::Context;
use serde::Serialize;

use fxquinox_core::{Entity, EntityType, PublishQuery, VersionQuery};

use crate::config::{Command, LodArgs, OutputFormat, PayloadArgs, PublishArgs, VersionArgs};
use crate::payload;

/// Outcome of a lookup on one entity.
#[derive(Debug, Serialize)]
pub struct Hit {
    pub entity_type: EntityType,
    pub entity: String,
    pub id: i64,
    /// Name of the matched publish or version.
    pub found: Option<String>,
    pub version_number: Option<i64>,
    pub path: Option<String>,
}

impl Hit {
    fn miss(entity: &Entity) -> Self {
        Self {
            entity_type: entity.entity_type(),
            entity: entity.name().to_string(),
            id: entity.id(),
            found: None,
            version_number: None,
            path: None,
        }
    }
}

/// Run `command`, writing results to `out`.
pub fn run(command: &Command, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Build(args) => build(args, format, out),
        Command::Publish(args) => publish(args, format, out),
        Command::Version(args) => version(args, format, out),
        Command::Lod(args) => lod(args, format, out),
    }
}

fn load(args: &PayloadArgs) -> anyhow::Result<Vec<Entity>> {
    let project = payload::load_project(args.project.as_deref())?;
    let records = payload::load_records(&args.payload)?;
    let entities = payload::build_entities(&project, &records)?;
    tracing::info!(
        project = %project.name,
        payload = %args.payload.display(),
        entities = entities.len(),
        "Payload loaded",
    );
    Ok(entities)
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn build(args: &PayloadArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let entities = load(args)?;
    match format {
        OutputFormat::Json => write_json(out, &entities)?,
        OutputFormat::Text => {
            for entity in &entities {
                writeln!(out, "{}", summary_line(entity))?;
            }
        }
    }
    Ok(())
}

fn summary_line(entity: &Entity) -> String {
    let base = entity.base();
    let mut line = format!(
        "{} {} ({}) publishes={} versions={}",
        entity.entity_type(),
        entity,
        entity.id(),
        base.publishes.len(),
        base.versions.len(),
    );
    if let Some(parent) = &base.parent {
        line.push_str(&format!(" parent={} {}", parent.entity_type, parent.name));
    }
    if let Entity::Shot(shot) = entity {
        let frames = shot.frames();
        line.push_str(&format!(
            " cut={}-{} handles={}-{}",
            frames.cut_in, frames.cut_out, frames.handle_cut_in, frames.handle_cut_out
        ));
    }
    line
}

// ---------------------------------------------------------------------------
// publish / version / lod
// ---------------------------------------------------------------------------

fn publish(args: &PublishArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let entities = load(&args.input)?;

    let mut query = PublishQuery::new(&args.step);
    if let Some(task) = &args.task {
        query = query.task(task);
    }
    if let Some(file_type) = &args.file_type {
        query = query.file_type(file_type);
    }
    if let Some(category) = &args.category {
        query = query.category(category);
    }
    if let Some(plate) = &args.plate {
        query = query.plate(plate);
    }
    if let Some(version) = args.version {
        query = query.version(version);
    }

    let hits = entities
        .iter()
        .map(|entity| -> anyhow::Result<Hit> {
            let found = entity
                .publish_for_step(&query)
                .with_context(|| format!("publish lookup on {} '{}'", entity.entity_type(), entity))?;
            Ok(match found {
                Some(p) => Hit {
                    found: Some(p.base.name.clone()),
                    version_number: Some(p.version_number),
                    path: non_empty(&p.file_path),
                    ..Hit::miss(entity)
                },
                None => Hit::miss(entity),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    report(&hits, format, out)
}

fn version(args: &VersionArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let entities = load(&args.input)?;

    let mut query = VersionQuery::new(&args.step);
    if let Some(task) = &args.task {
        query = query.task(task);
    }
    if let Some(version) = args.version {
        query = query.version(version);
    }

    let hits: Vec<Hit> = entities
        .iter()
        .map(|entity| match entity.version_for_step(&query) {
            Some(v) => Hit {
                found: Some(v.base.name.clone()),
                version_number: Some(v.version_number()),
                path: non_empty(&v.path_to_movie).or_else(|| non_empty(&v.path_to_frames)),
                ..Hit::miss(entity)
            },
            None => Hit::miss(entity),
        })
        .collect();
    report(&hits, format, out)
}

fn lod(args: &LodArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let entities = load(&args.input)?;

    let hits: Vec<Hit> = entities
        .iter()
        .filter_map(|entity| match entity {
            Entity::Asset(asset) => Some((entity, asset)),
            other => {
                tracing::debug!(entity = %other, entity_type = %other.entity_type(), "Not an asset, skipped");
                None
            }
        })
        .map(|(entity, asset)| match asset.highest_lod(&args.step, &args.task_basename) {
            Some(p) => Hit {
                found: Some(p.base.name.clone()),
                version_number: Some(p.version_number),
                path: non_empty(&p.file_path),
                ..Hit::miss(entity)
            },
            None => Hit::miss(entity),
        })
        .collect();
    if hits.is_empty() {
        anyhow::bail!("payload {} holds no assets", args.input.payload.display());
    }
    report(&hits, format, out)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn report(hits: &[Hit], format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, hits)?,
        OutputFormat::Text => {
            for hit in hits {
                let found = match (&hit.found, hit.version_number) {
                    (Some(name), Some(v)) => format!("{name} v{v}"),
                    (Some(name), None) => name.clone(),
                    (None, _) => "no match".to_string(),
                };
                write!(out, "{} {} ({}): {found}", hit.entity_type, hit.entity, hit.id)?;
                if let Some(path) = &hit.path {
                    write!(out, " {path}")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialise output")?;
    writeln!(out)?;
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

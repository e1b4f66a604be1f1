//! `fxquinox` -- inspect tracking payloads as typed pipeline entities.
//!
//! Reads JSON records exported from the production tracker, builds the
//! typed entity tree and answers step lookups:
//!
//! ```text
//! fxquinox build   --payload shots.json [--project project.json]
//! fxquinox publish --payload shots.json --step Comp [--task comp] [--file-type ...]
//! fxquinox version --payload shots.json --step Comp [--version 3]
//! fxquinox lod     --payload assets.json --step Model --task-basename model_lod
//! ```
//!
//! See [`fxquinox_cli::config`] for the environment variables.

use clap::Parser;

use fxquinox_cli::config::Cli;
use fxquinox_cli::{commands, logging};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(&cli.log, cli.log_format)?;

    tracing::debug!(command = ?cli.command, "Starting fxquinox");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli.command, cli.format, &mut out)
}

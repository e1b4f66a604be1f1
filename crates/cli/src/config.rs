//! Command-line and environment configuration.
//!
//! Every option can be supplied on the command line; the ones below also
//! fall back to the environment (a `.env` file in the working directory is
//! loaded first).
//!
//! | Variable              | Default                                              | Description                       |
//! |-----------------------|------------------------------------------------------|-----------------------------------|
//! | `FXQUINOX_LOG`        | `fxquinox=info,fxquinox_core=info,fxquinox_cli=info` | `tracing` filter directives       |
//! | `FXQUINOX_LOG_FORMAT` | `text`                                               | Log line format, `text` or `json` |
//! | `FXQUINOX_PROJECT`    | --                                                   | Path to a `Project` record file   |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default `tracing` filter when `FXQUINOX_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "fxquinox=info,fxquinox_core=info,fxquinox_cli=info";

/// Inspect tracking payloads as typed pipeline entities.
#[derive(Parser, Debug)]
#[command(name = "fxquinox")]
#[command(about = "Inspect tracking payloads as typed pipeline entities")]
#[command(version)]
pub struct Cli {
    /// `tracing` filter directives
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILTER, env = "FXQUINOX_LOG")]
    pub log: String,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "FXQUINOX_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every record in a payload and summarise the result
    Build(PayloadArgs),
    /// Find the latest publish for a step on each entity
    Publish(PublishArgs),
    /// Find the latest version for a step on each entity
    Version(VersionArgs),
    /// Find the highest level-of-detail publish on each asset
    Lod(LodArgs),
}

/// Input files shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    /// JSON file holding one record or an array of records
    #[arg(long)]
    pub payload: PathBuf,

    /// JSON file holding the owning `Project` record
    #[arg(long, env = "FXQUINOX_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    #[command(flatten)]
    pub input: PayloadArgs,

    /// Pipeline step name, e.g. `Comp`
    #[arg(long)]
    pub step: String,

    /// Task name; when given, both step and task must match
    #[arg(long)]
    pub task: Option<String>,

    /// Published file type, e.g. `Alembic Cache`
    #[arg(long)]
    pub file_type: Option<String>,

    /// Publish category
    #[arg(long)]
    pub category: Option<String>,

    /// Exact version number instead of the latest
    #[arg(long)]
    pub version: Option<i64>,

    /// Plate name
    #[arg(long)]
    pub plate: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    #[command(flatten)]
    pub input: PayloadArgs,

    #[arg(long)]
    pub step: String,

    #[arg(long)]
    pub task: Option<String>,

    #[arg(long)]
    pub version: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct LodArgs {
    #[command(flatten)]
    pub input: PayloadArgs,

    #[arg(long)]
    pub step: String,

    /// Task name without its level-of-detail letter, e.g. `model_lod`
    #[arg(long)]
    pub task_basename: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_publish_flags() {
        let cli = Cli::try_parse_from([
            "fxquinox",
            "--format",
            "json",
            "publish",
            "--payload",
            "shots.json",
            "--step",
            "Comp",
            "--file-type",
            "Rendered Image",
            "--version",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(args.input.payload, PathBuf::from("shots.json"));
        assert_eq!(args.step, "Comp");
        assert_eq!(args.file_type.as_deref(), Some("Rendered Image"));
        assert_eq!(args.version, Some(4));
        assert_eq!(args.task, None);
    }

    #[test]
    fn lod_requires_basename() {
        let result = Cli::try_parse_from(["fxquinox", "lod", "--payload", "a.json", "--step", "Model"]);
        assert!(result.is_err());
    }
}

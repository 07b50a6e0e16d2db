//! Library interface for the `semtag` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`SourceArgs`] - Command-line overrides for the `[source]` config section
//! - [`commands`] - Command implementations
//!
//! # Documentation Generation
//!
//! The [`command()`] function returns the clap `Command` for generating man pages
//! and shell completions via `xtask`.

pub mod commands;

use camino::Utf8PathBuf;
use clap::{Args, CommandFactory, Parser, Subcommand};
use semtag_core::SourceConfig;
use std::path::PathBuf;

/// Name of the installed binary.
pub const BIN_NAME: &str = "semtag";

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode. The override only
    /// affects output styled through `commands::paint`.
    pub fn apply(self) {
        match self {
            Self::Auto => owo_colors::unset_override(),
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                Log filter (e.g., debug, semtag_core=trace)
    SEMTAG_LOG_PATH         Explicit JSONL log file path
    SEMTAG_LOG_DIR          JSONL log directory
    SEMTAG_URI              Remote to read and publish tags (source.uri)
    SEMTAG_REPOSITORY       Local checkout instead of a remote (source.repository)
    SEMTAG_BRANCH           Only count tags merged into origin/<branch>
    SEMTAG_PREFIX           Tag prefix (default: v)
    SEMTAG_WORK_DIR         Working copy location for a remote source
    BUILD_PIPELINE_NAME     Recorded in the tag annotation
    BUILD_JOB_NAME          Recorded in the tag annotation
    BUILD_NAME              Recorded in the tag annotation
";

/// Command-line interface definition for semtag.
#[derive(Parser)]
#[command(name = BIN_NAME)]
#[command(about = "Read and publish semantic versions as git tags", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Version source overrides.
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Overrides for the `[source]` config section.
#[derive(Args, Debug, Default, Clone)]
#[command(next_help_heading = "Source")]
pub struct SourceArgs {
    /// Remote URI holding the version tags
    #[arg(long, global = true, value_name = "URI", conflicts_with = "repository")]
    pub uri: Option<String>,

    /// Existing local checkout to use instead of a remote
    #[arg(long, global = true, value_name = "PATH")]
    pub repository: Option<Utf8PathBuf>,

    /// Only consider tags merged into origin/BRANCH
    #[arg(long, global = true, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Tag prefix [default: v]
    #[arg(long, global = true, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Working copy location when using --uri
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,
}

impl SourceArgs {
    /// Apply the flags that were given on top of `source`.
    ///
    /// `--uri` clears a configured `repository` and vice versa, so a flag
    /// always wins over the other kind of source coming from config.
    pub fn apply(&self, source: &mut SourceConfig) {
        if let Some(ref uri) = self.uri {
            source.uri = Some(uri.clone());
            source.repository = None;
        }
        if let Some(ref repository) = self.repository {
            source.repository = Some(repository.clone());
            source.uri = None;
        }
        if let Some(ref branch) = self.branch {
            source.branch = Some(branch.clone());
        }
        if let Some(ref prefix) = self.prefix {
            source.prefix.clone_from(prefix);
        }
        if let Some(ref work_dir) = self.work_dir {
            source.work_dir = Some(work_dir.clone());
        }
    }
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the highest published version
    Current(commands::current::CurrentArgs),

    /// Tag a commit with a version and push the tag
    Publish(commands::publish::PublishArgs),

    /// Prepare the working copy without reading or writing tags
    Setup(commands::setup::SetupArgs),

    /// Diagnose configuration and environment
    Doctor(commands::doctor::DoctorArgs),

    /// Show package and configuration information
    Info(commands::info::InfoArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

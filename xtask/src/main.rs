//! Release asset generation for semtag.
//!
//! - `completions` - shell completions into `dist/share/completions`
//! - `man` - man pages into `dist/share/man/man1`
//! - `dist` - both, under one share directory
//!
//! Run `cargo xtask --help` to see available commands.

#![deny(unsafe_code)]

mod commands;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

/// Default root for generated assets, relative to the workspace.
const DIST_SHARE: &str = "dist/share";

#[derive(Parser, Debug)]
#[command(name = "xtask")]
#[command(about = "Generate semtag release assets")]
struct Xtask {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Generate shell completions for the semtag CLI.
    Completions(commands::completions::CompletionsArgs),

    /// Generate manpages for `semtag` and each subcommand.
    Man(commands::man::ManArgs),

    /// Generate completions and manpages for every shell.
    Dist {
        /// Share directory to populate
        #[arg(long = "out-dir", default_value = DIST_SHARE)]
        out_dir: PathBuf,
    },
}

fn main() -> Result<(), String> {
    match Xtask::parse().command {
        Task::Completions(args) => commands::completions::cmd_completions(args),
        Task::Man(args) => commands::man::cmd_man(args),
        Task::Dist { out_dir } => {
            commands::completions::cmd_completions(commands::completions::CompletionsArgs {
                out_dir: out_dir.join("completions"),
                shell: None,
            })?;
            commands::man::cmd_man(commands::man::ManArgs {
                out_dir: out_dir.join("man").join("man1"),
            })
        }
    }
}

/// The workspace root: the parent of this crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf()
}

/// Resolve `out_dir` against the workspace root and make sure it exists.
pub fn prepare_out_dir(out_dir: &Path) -> Result<PathBuf, String> {
    let out_dir = workspace_root().join(out_dir);
    fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;
    Ok(out_dir)
}

/// Write one generated file and report it.
pub fn write_asset(path: &Path, contents: &[u8]) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

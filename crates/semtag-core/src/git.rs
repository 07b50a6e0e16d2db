//! Git subprocess layer.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, credential helpers, and other configuration.
//!
//! The driver talks to git only through the [`Git`] trait so the tag protocol
//! can be exercised against a scripted implementation in tests.

#[cfg(test)]
pub(crate) mod mock;

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git` could not be found on `PATH`.
    #[error("git executable not found on PATH")]
    NotInstalled,

    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {output}")]
    Command {
        /// The git subcommand that failed (e.g., "push").
        command: String,
        /// Combined stdout and stderr.
        output: String,
    },
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Captured result of a finished git invocation.
///
/// stdout and stderr are merged because git reports most interesting
/// conditions (rejections, missing refs) on stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Whether git exited with status zero.
    pub success: bool,
    /// Combined stdout and stderr, lossily decoded.
    pub output: String,
}

impl GitOutput {
    /// A successful invocation with the given output.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A failed invocation with the given output.
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }

    /// Convert a non-zero exit into [`GitError::Command`].
    ///
    /// The raw output is logged before the error is returned so nothing
    /// git said is lost.
    pub fn into_result(self, args: &[&str]) -> GitResult<String> {
        if self.success {
            Ok(self.output)
        } else {
            tracing::warn!(command = %display_args(args), output = %self.output.trim_end(), "git command failed");
            Err(GitError::Command {
                command: subcommand(args).to_string(),
                output: self.output.trim().to_string(),
            })
        }
    }
}

/// Something that can run git.
pub trait Git {
    /// Run `git <args>`, optionally inside `dir`.
    ///
    /// A non-zero exit is *not* an error at this level; callers inspect
    /// [`GitOutput::success`] and the output text to classify the failure.
    fn run(&self, dir: Option<&Utf8Path>, args: &[&str]) -> GitResult<GitOutput>;
}

impl<G: Git + ?Sized> Git for &G {
    fn run(&self, dir: Option<&Utf8Path>, args: &[&str]) -> GitResult<GitOutput> {
        (**self).run(dir, args)
    }
}

/// Runs the `git` found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    /// Check that `git` is installed and return the runner.
    pub fn locate() -> GitResult<Self> {
        let path = which::which("git").map_err(|_| GitError::NotInstalled)?;
        debug!(path = %path.display(), "found git");
        Ok(Self)
    }
}

impl Git for SystemGit {
    #[instrument(level = "debug", skip(self), fields(command = %display_args(args)))]
    fn run(&self, dir: Option<&Utf8Path>, args: &[&str]) -> GitResult<GitOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = dir {
            cmd.current_dir(dir.as_std_path());
        }

        let output = cmd.output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let success = output.status.success();
        debug!(success, code = ?output.status.code(), "git finished");
        let trimmed = text.trim_end();
        if !trimmed.is_empty() {
            if success && forwards_output(args) {
                info!(output = %trimmed, "git output");
            } else {
                debug!(output = %trimmed, "git output");
            }
        }

        Ok(GitOutput {
            success,
            output: text,
        })
    }
}

/// Whether `git` is available on `PATH`.
pub fn is_installed() -> bool {
    which::which("git").is_ok()
}

fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    args.iter()
        .find(|arg| !arg.starts_with('-'))
        .copied()
        .unwrap_or("")
}

/// Commands that change the repository or talk to the remote have their
/// output shown at the default log level when they succeed. Everything
/// else stays at `debug`; failures are reported by [`GitOutput::into_result`].
fn forwards_output(args: &[&str]) -> bool {
    matches!(subcommand(args), "fetch" | "init" | "remote" | "push")
}

fn display_args(args: &[&str]) -> String {
    args.join(" ")
}

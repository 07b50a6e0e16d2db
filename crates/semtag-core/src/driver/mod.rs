//! The git-tag version driver.
//!
//! Three steps, each in its own module:
//!
//! - [`binding`] resolves the working copy and tag prefix from
//!   [`SourceConfig`](crate::config::SourceConfig).
//! - [`reader`] fetches tags and reduces them to the current version.
//! - [`writer`] tags a commit and pushes the tag, treating a lost push race
//!   as an outcome instead of an error.
//!
//! [`GitTagDriver`] bundles the three behind one value that owns the binding
//! and the git runner, so nothing is shared through process-wide state.
//!
//! ```no_run
//! use semtag_core::config::SourceConfig;
//! use semtag_core::driver::{GitTagDriver, RefSource};
//! use semtag_core::semver::Version;
//!
//! let source = SourceConfig {
//!     uri: Some("https://example.com/app.git".into()),
//!     ..SourceConfig::default()
//! };
//! let driver = GitTagDriver::set_up(&source)?;
//! let current = driver.read_version()?.unwrap_or(Version::new(0, 0, 0));
//! let next = Version::new(current.major, current.minor + 1, 0);
//! let outcome = driver.write_version(&next, &RefSource::Remote)?;
//! println!("{}: published = {}", outcome.tag(), outcome.is_published());
//! # Ok::<(), semtag_core::driver::DriverError>(())
//! ```

pub mod binding;
pub mod reader;
pub mod writer;

use camino::Utf8Path;
use semver::Version;
use tracing::instrument;

use crate::annotation::BuildMetadata;
use crate::config::SourceConfig;
use crate::git::{Git, GitResult, SystemGit};

pub use crate::error::{DriverError, DriverResult};
pub use binding::Binding;
pub use writer::{PublishOutcome, RefSource};

/// A set-up driver: a resolved working copy plus the git runner.
#[derive(Debug)]
pub struct GitTagDriver<G = SystemGit> {
    binding: Binding,
    git: G,
    metadata: BuildMetadata,
}

impl GitTagDriver<SystemGit> {
    /// Set up against the system `git`, reading annotation metadata from
    /// the environment.
    pub fn set_up(source: &SourceConfig) -> DriverResult<Self> {
        let git = SystemGit::locate()?;
        Self::set_up_with(source, git)
    }
}

impl<G: Git> GitTagDriver<G> {
    /// Set up with an arbitrary git runner.
    #[instrument(name = "set_up_repo", skip_all)]
    pub fn set_up_with(source: &SourceConfig, git: G) -> DriverResult<Self> {
        let binding = Binding::set_up(source, &git)?;
        Ok(Self {
            binding,
            git,
            metadata: BuildMetadata::from_env(),
        })
    }

    /// Replace the annotation metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: BuildMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The resolved binding.
    pub const fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The current version, or `None` if the repository has no tags yet.
    ///
    /// See [`reader::read_version`].
    pub fn read_version(&self) -> DriverResult<Option<Version>> {
        reader::read_version(&self.binding, &self.git)
    }

    /// Publish `version` as a tag.
    ///
    /// See [`writer::write_version`].
    pub fn write_version(
        &self,
        version: &Version,
        source: &RefSource,
    ) -> DriverResult<PublishOutcome> {
        writer::write_version(&self.binding, &self.git, version, source, &self.metadata)
    }
}

/// Run a command that must succeed and return its output.
fn run_checked<G: Git>(git: &G, dir: Option<&Utf8Path>, args: &[&str]) -> GitResult<String> {
    git.run(dir, args)?.into_result(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use crate::git::GitOutput;
    use crate::git::mock::ScriptedGit;

    #[test]
    fn driver_reads_through_binding() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let source = SourceConfig {
            repository: Some(path.clone()),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new()
            .on(&["fetch", "--tags"], GitOutput::ok(""))
            .on(&["tag", "-l", "v*"], GitOutput::ok("v0.1.0\nv0.2.0\n"));

        let driver = GitTagDriver::set_up_with(&source, &git).unwrap();
        assert_eq!(driver.binding().work_dir(), path.as_path());
        assert_eq!(driver.read_version().unwrap(), Some(Version::new(0, 2, 0)));
        assert!(git.calls().iter().all(|c| c.dir.as_deref() == Some(path.as_path())));
    }

    #[test]
    fn driver_uses_supplied_metadata() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let source = SourceConfig {
            repository: Some(path),
            ..SourceConfig::default()
        };
        let commit = "0123456789abcdef0123456789abcdef01234567";
        let git = ScriptedGit::new()
            .on(&["fetch", "--tags", "--dry-run", "--depth=1"], GitOutput::ok(""))
            .on(&["ls-remote", "origin", "HEAD"], GitOutput::ok(format!("{commit}\tHEAD\n")))
            .on(
                &["tag", "--force", "--annotate", "--message", "Pipeline: p\nJob: j\nBuild: 7", "v1.0.0", commit],
                GitOutput::ok(""),
            )
            .on(&["ls-remote", "origin", "refs/tags/v1.0.0"], GitOutput::ok(""))
            .on(&["push", "origin", "v1.0.0"], GitOutput::ok(" * [new tag]         v1.0.0 -> v1.0.0\n"));

        let driver = GitTagDriver::set_up_with(&source, &git)
            .unwrap()
            .with_metadata(BuildMetadata {
                pipeline: "p".into(),
                job: "j".into(),
                build: "7".into(),
            });
        let outcome = driver
            .write_version(&Version::new(1, 0, 0), &RefSource::Remote)
            .unwrap();
        assert!(outcome.is_published());
    }
}

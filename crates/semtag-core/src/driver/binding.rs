//! Repository binding: which working copy the driver operates on.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{DriverError, DriverResult, run_checked};
use crate::config::SourceConfig;
use crate::git::Git;

/// Where the tags live, as resolved from configuration.
///
/// Produced by [`Binding::set_up`] and passed explicitly to the reader and
/// writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    work_dir: Utf8PathBuf,
    prefix: String,
    branch: Option<String>,
    origin: Origin,
}

/// How the working copy came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// An existing checkout named by `repository`.
    LocalPath,
    /// A working copy for `uri` that already existed.
    Reused,
    /// A working copy for `uri` created by this set-up.
    Initialized,
}

impl Binding {
    /// Resolve the working copy for `source`.
    ///
    /// - `repository` set: it must exist as a directory and is used as is.
    /// - `uri` set: the working directory is reused if present, otherwise
    ///   created with `git init` and given `uri` as its `origin` remote.
    ///
    /// Setting both or neither is a configuration error. A blank prefix
    /// becomes `"v"`.
    #[instrument(skip_all, fields(configured_uri = ?source.uri, configured_repository = ?source.repository))]
    pub fn set_up<G: Git>(source: &SourceConfig, git: &G) -> DriverResult<Self> {
        let repository = source.repository.as_ref().filter(|p| !p.as_str().is_empty());
        let uri = source.uri.as_deref().filter(|u| !u.is_empty());

        let (work_dir, origin) = match (repository, uri) {
            (Some(_), Some(_)) => {
                return Err(DriverError::Config(
                    "expected either repository (path) or uri to be configured, not both".into(),
                ));
            }
            (None, None) => {
                return Err(DriverError::Config(
                    "expected either repository (path) or uri to be configured".into(),
                ));
            }
            (Some(path), None) => {
                if !path.is_dir() {
                    return Err(DriverError::MissingRepository(path.clone()));
                }
                (path.clone(), Origin::LocalPath)
            }
            (None, Some(uri)) => {
                let work_dir = source.effective_work_dir().ok_or(DriverError::NoWorkDir)?;
                if work_dir.exists() {
                    debug!(%work_dir, "reusing working directory");
                    (work_dir, Origin::Reused)
                } else {
                    init_work_dir(git, &work_dir, uri)?;
                    (work_dir, Origin::Initialized)
                }
            }
        };

        let binding = Self {
            work_dir,
            prefix: source.effective_prefix().to_string(),
            branch: source.branch().map(str::to_string),
            origin,
        };
        info!(
            work_dir = %binding.work_dir,
            prefix = %binding.prefix,
            branch = ?binding.branch,
            origin = ?binding.origin,
            "repository bound"
        );
        Ok(binding)
    }

    /// The working copy git commands run in.
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }

    /// The tag prefix, never empty.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The branch filter, if any.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// How the working copy was obtained.
    pub const fn origin(&self) -> Origin {
        self.origin
    }
}

/// `git init <dir>` then `git remote add origin <uri>` inside it.
///
/// The directory did not exist before this call. It is removed again when
/// the remote cannot be added, since any existing directory is reused as is.
fn init_work_dir<G: Git>(git: &G, work_dir: &Utf8Path, uri: &str) -> DriverResult<()> {
    info!(%work_dir, %uri, "initializing working directory");
    run_checked(git, None, &["init", work_dir.as_str()])?;
    if let Err(err) = run_checked(git, Some(work_dir), &["remote", "add", "origin", uri]) {
        if work_dir.exists()
            && let Err(cleanup) = std::fs::remove_dir_all(work_dir)
        {
            warn!(%work_dir, error = %cleanup, "could not remove partial working directory");
        }
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitOutput;
    use crate::git::mock::ScriptedGit;
    use tempfile::TempDir;

    fn utf8(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn neither_path_nor_uri_is_a_config_error() {
        let git = ScriptedGit::new();
        let err = Binding::set_up(&SourceConfig::default(), &git).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
        assert!(git.calls().is_empty());
    }

    #[test]
    fn both_path_and_uri_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let source = SourceConfig {
            repository: Some(utf8(&tmp)),
            uri: Some("https://example.com/app.git".into()),
            ..SourceConfig::default()
        };
        let err = Binding::set_up(&source, &ScriptedGit::new()).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let tmp = TempDir::new().unwrap();
        let source = SourceConfig {
            repository: Some(utf8(&tmp)),
            uri: Some(String::new()),
            ..SourceConfig::default()
        };
        let binding = Binding::set_up(&source, &ScriptedGit::new()).unwrap();
        assert_eq!(binding.origin(), Origin::LocalPath);
    }

    #[test]
    fn existing_local_path_is_used_directly() {
        let tmp = TempDir::new().unwrap();
        let source = SourceConfig {
            repository: Some(utf8(&tmp)),
            branch: Some("main".into()),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new();

        let binding = Binding::set_up(&source, &git).unwrap();

        assert_eq!(binding.work_dir(), utf8(&tmp).as_path());
        assert_eq!(binding.prefix(), "v");
        assert_eq!(binding.branch(), Some("main"));
        assert_eq!(binding.origin(), Origin::LocalPath);
        assert!(git.calls().is_empty());
    }

    #[test]
    fn missing_local_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = utf8(&tmp).join("nope");
        let source = SourceConfig {
            repository: Some(missing.clone()),
            ..SourceConfig::default()
        };
        let err = Binding::set_up(&source, &ScriptedGit::new()).unwrap_err();
        assert!(matches!(err, DriverError::MissingRepository(p) if p == missing));
    }

    #[test]
    fn uri_initializes_missing_work_dir() {
        let tmp = TempDir::new().unwrap();
        let work_dir = utf8(&tmp).join("repo");
        let uri = "https://example.com/app.git";
        let source = SourceConfig {
            uri: Some(uri.into()),
            work_dir: Some(work_dir.clone()),
            prefix: "rel-".into(),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new()
            .on(&["init", work_dir.as_str()], GitOutput::ok("Initialized empty Git repository\n"))
            .on(&["remote", "add", "origin", uri], GitOutput::ok(""));

        let binding = Binding::set_up(&source, &git).unwrap();

        assert_eq!(binding.origin(), Origin::Initialized);
        assert_eq!(binding.prefix(), "rel-");
        let calls = git.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].dir, None);
        assert_eq!(calls[1].dir.as_deref(), Some(work_dir.as_path()));
    }

    #[test]
    fn uri_reuses_existing_work_dir() {
        let tmp = TempDir::new().unwrap();
        let source = SourceConfig {
            uri: Some("https://example.com/app.git".into()),
            work_dir: Some(utf8(&tmp)),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new();

        let binding = Binding::set_up(&source, &git).unwrap();

        assert_eq!(binding.origin(), Origin::Reused);
        assert!(git.calls().is_empty());
    }

    #[test]
    fn failed_init_aborts_before_remote_add() {
        let tmp = TempDir::new().unwrap();
        let work_dir = utf8(&tmp).join("repo");
        let source = SourceConfig {
            uri: Some("https://example.com/app.git".into()),
            work_dir: Some(work_dir.clone()),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new().on(
            &["init", work_dir.as_str()],
            GitOutput::failed("fatal: cannot mkdir: Permission denied\n"),
        );

        let err = Binding::set_up(&source, &git).unwrap_err();

        assert!(matches!(err, DriverError::Git(_)));
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn failed_remote_add_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let work_dir = utf8(&tmp).join("repo");
        let uri = "https://example.com/app.git";
        let source = SourceConfig {
            uri: Some(uri.into()),
            work_dir: Some(work_dir.clone()),
            ..SourceConfig::default()
        };
        let git = ScriptedGit::new()
            .on(&["init", work_dir.as_str()], GitOutput::ok(""))
            .on(
                &["remote", "add", "origin", uri],
                GitOutput::failed("error: remote origin already exists.\n"),
            );

        let err = Binding::set_up(&source, &git).unwrap_err();
        assert!(err.to_string().contains("remote origin already exists"));
    }

    /// Creates the directory on `init` like real git, then replies from the
    /// script.
    struct InitCreatesDir(ScriptedGit);

    impl Git for InitCreatesDir {
        fn run(&self, dir: Option<&Utf8Path>, args: &[&str]) -> crate::git::GitResult<GitOutput> {
            if let ["init", path] = args {
                std::fs::create_dir_all(path).unwrap();
            }
            self.0.run(dir, args)
        }
    }

    #[test]
    fn failed_remote_add_removes_the_new_work_dir() {
        let tmp = TempDir::new().unwrap();
        let work_dir = utf8(&tmp).join("cache").join("repo");
        let uri = "https://example.com/app.git";
        let source = SourceConfig {
            uri: Some(uri.into()),
            work_dir: Some(work_dir.clone()),
            ..SourceConfig::default()
        };
        let git = InitCreatesDir(
            ScriptedGit::new()
                .on(&["init", work_dir.as_str()], GitOutput::ok(""))
                .on(
                    &["remote", "add", "origin", uri],
                    GitOutput::failed("fatal: unable to write config\n"),
                ),
        );

        assert!(Binding::set_up(&source, &git).is_err());
        assert!(!work_dir.exists());

        // The next attempt initializes again instead of reusing a directory
        // with no origin.
        let git = ScriptedGit::new()
            .on(&["init", work_dir.as_str()], GitOutput::ok(""))
            .on(&["remote", "add", "origin", uri], GitOutput::ok(""));
        let binding = Binding::set_up(&source, &git).unwrap();
        assert_eq!(binding.origin(), Origin::Initialized);
    }
}

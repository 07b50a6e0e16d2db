//! Error types for semtag-core.
//!
//! Configuration problems surface while loading, before any git command runs.
//! Everything the driver can hit afterwards is a [`DriverError`], which wraps
//! the lower-level [`GitError`] and [`VersionError`].

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::git::GitError;
use crate::version::VersionError;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from the version driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The source configuration is unusable (e.g. both or neither of
    /// `uri` and `repository` set).
    #[error("invalid source configuration: {0}")]
    Config(String),

    /// The configured local repository path does not exist.
    #[error("repository path {0} does not exist or is not a directory")]
    MissingRepository(Utf8PathBuf),

    /// No working directory is configured and none could be derived.
    #[error("no working directory: set source.work_dir")]
    NoWorkDir,

    /// The remote has no commit at the requested ref.
    #[error("no commit found at {0} on origin")]
    RefNotFound(String),

    /// `git log` did not produce a commit hash.
    #[error("could not read a commit hash from {0:?}")]
    InvalidCommitHash(String),

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A tag could not be parsed.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Result alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_conflicts_name_both_keys() {
        let err = DriverError::Config(
            "expected either repository (path) or uri to be configured, not both".into(),
        );
        assert_eq!(
            err.to_string(),
            "invalid source configuration: expected either repository (path) or uri to be configured, not both"
        );
    }

    #[test]
    fn missing_repository_shows_the_path() {
        let err = DriverError::MissingRepository(Utf8PathBuf::from("/srv/nope"));
        assert!(err.to_string().contains("/srv/nope"));
    }

    #[test]
    fn git_errors_pass_through_unchanged() {
        let err = DriverError::from(GitError::NotInstalled);
        assert_eq!(err.to_string(), "git executable not found on PATH");
    }

    #[test]
    fn not_found_config_message() {
        assert_eq!(ConfigError::NotFound.to_string(), "no configuration file found");
    }
}

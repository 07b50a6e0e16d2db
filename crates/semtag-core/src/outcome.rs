//! Classification of git failures that are expected outcomes.
//!
//! Git does not expose these conditions through exit codes, so they are
//! recognized by substring in the combined command output. The patterns
//! below are part of the external contract and depend on the git version in
//! use; anything that does not match one of them is a real failure.

use serde::Serialize;

/// `git tag`/`git describe` output when the repository has no tags.
pub const NO_NAMES_PATTERN: &str = "No names found, cannot describe anything";

/// `git tag --merged` output when `HEAD` does not resolve (empty repository).
pub const INVALID_HEAD_PATTERN: &str = "Not a valid object name HEAD";

/// `git push` marker for a locally rejected ref update (non-fast-forward,
/// tag already exists).
pub const PUSH_REJECTED_PATTERN: &str = "[rejected]";

/// `git push` marker for a ref update the remote refused (e.g. lost race,
/// server-side hook).
pub const PUSH_REMOTE_REJECTED_PATTERN: &str = "[remote rejected]";

/// Why a tag listing found nothing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRepository {
    /// No tags exist.
    NoNames,
    /// The repository has no commits, so `HEAD` is not a valid object.
    InvalidHead,
}

impl EmptyRepository {
    /// Recognize an empty-repository condition in failed listing output.
    pub fn classify(output: &str) -> Option<Self> {
        if output.contains(NO_NAMES_PATTERN) {
            Some(Self::NoNames)
        } else if output.contains(INVALID_HEAD_PATTERN) {
            Some(Self::InvalidHead)
        } else {
            None
        }
    }
}

/// Why a tag push was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// git refused the update before sending it.
    Rejected,
    /// The remote refused the update.
    RemoteRejected,
}

impl Rejection {
    /// Recognize a push rejection in push output.
    ///
    /// `[remote rejected]` is checked first since it is the more specific
    /// marker; the two never both describe the same ref.
    pub fn classify(output: &str) -> Option<Self> {
        if output.contains(PUSH_REMOTE_REJECTED_PATTERN) {
            Some(Self::RemoteRejected)
        } else if output.contains(PUSH_REJECTED_PATTERN) {
            Some(Self::Rejected)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected"),
            Self::RemoteRejected => write!(f, "remote rejected"),
        }
    }
}

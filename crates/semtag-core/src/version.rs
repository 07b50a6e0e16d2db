//! Version tags: parsing tag listings and naming new tags.
//!
//! A version tag is `<prefix><semver>`, e.g. `v1.4.0` or `release-2.0.0-rc.1`.
//! Every tag handed to [`current_version`] must carry the prefix; a stray tag
//! is an error rather than something to skip, because silently ignoring it
//! could publish a version that already exists under another spelling.

use std::cmp::Ordering;

use semver::Version;
use serde::Serialize;
use thiserror::Error;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "v";

/// Errors from version tag parsing.
#[derive(Error, Debug)]
pub enum VersionError {
    /// A listed tag does not start with the configured prefix.
    #[error("unexpected tag {tag:?}: expected prefix {prefix:?}")]
    UnexpectedTag {
        /// The offending tag.
        tag: String,
        /// The prefix it was expected to carry.
        prefix: String,
    },

    /// The part after the prefix is not a semantic version.
    #[error("invalid semver in tag {tag:?}: {source}")]
    InvalidSemver {
        /// The offending tag.
        tag: String,
        /// Underlying parse error.
        source: semver::Error,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A fully-qualified tag name: prefix followed by the formatted version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Build the tag name for `version` under `prefix`.
    pub fn new(prefix: &str, version: &Version) -> Self {
        Self(format!("{prefix}{version}"))
    }

    /// The tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref, `refs/tags/<name>`.
    pub fn ref_name(&self) -> String {
        format!("refs/tags/{}", self.0)
    }

    /// Refspec that deletes the tag on a remote, `:refs/tags/<name>`.
    pub fn delete_refspec(&self) -> String {
        format!(":refs/tags/{}", self.0)
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a single tag, which must start with `prefix`.
pub fn parse_tag(prefix: &str, tag: &str) -> VersionResult<Version> {
    let Some(rest) = tag.strip_prefix(prefix) else {
        return Err(VersionError::UnexpectedTag {
            tag: tag.to_string(),
            prefix: prefix.to_string(),
        });
    };

    Version::parse(rest).map_err(|source| VersionError::InvalidSemver {
        tag: tag.to_string(),
        source,
    })
}

/// Reduce a newline-separated tag listing to its highest version.
///
/// Blank lines are skipped and surrounding whitespace is trimmed. The
/// reduction starts at `0.0.0`, so an empty listing yields `0.0.0`.
/// Comparison uses semver precedence, which ignores build metadata; of two
/// tags with equal precedence the first one listed wins.
pub fn current_version(prefix: &str, listing: &str) -> VersionResult<Version> {
    let mut max = Version::new(0, 0, 0);

    for line in listing.lines() {
        let tag = line.trim();
        if tag.is_empty() {
            continue;
        }

        let current = parse_tag(prefix, tag)?;
        if current.cmp_precedence(&max) == Ordering::Greater {
            max = current;
        }
    }

    Ok(max)
}

//! Version writer: tag a commit and push the tag.
//!
//! The sequence is
//! `fetched → ref-resolved → tagged-locally → remote-reconciled → pushed`.
//! Nothing is retried and nothing is rolled back: a failure leaves the local
//! tag (and, past reconciliation, a deleted remote tag) as it is, and the
//! caller decides whether to run again.

use camino::{Utf8Path, Utf8PathBuf};
use semver::Version;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{Binding, DriverError, DriverResult, run_checked};
use crate::annotation::BuildMetadata;
use crate::git::Git;
use crate::outcome::Rejection;
use crate::version::TagName;

/// Which commit a new version tag points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefSource {
    /// The commit `origin` currently has at the bound branch, or at `HEAD`
    /// when no branch is bound.
    #[default]
    Remote,
    /// The `HEAD` commit of another checked-out repository at this path.
    Repository(Utf8PathBuf),
}

/// What happened to the pushed tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PublishOutcome {
    /// The tag is on the remote.
    Published {
        /// The tag that was pushed.
        tag: TagName,
        /// The commit it points at.
        commit: String,
    },
    /// The remote refused the tag, most likely because a concurrent
    /// publisher got there first. Not an error; retry or accept.
    Rejected {
        /// The tag that was refused.
        tag: TagName,
        /// Which rejection marker git reported.
        reason: Rejection,
    },
}

impl PublishOutcome {
    /// Whether the tag made it to the remote.
    pub const fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    /// The tag this outcome is about.
    pub const fn tag(&self) -> &TagName {
        match self {
            Self::Published { tag, .. } | Self::Rejected { tag, .. } => tag,
        }
    }
}

/// Create (or move) the annotated tag `<prefix><version>` and push it.
///
/// 1. Dry-run fetch to check the remote is reachable.
/// 2. Resolve the target commit from `source`.
/// 3. `git tag --force --annotate` at that commit.
/// 4. If the remote already has the tag, delete it there.
/// 5. Push the tag. A `[rejected]` or `[remote rejected]` push yields
///    [`PublishOutcome::Rejected`].
///
/// # Errors
///
/// Any git failure other than a push rejection, and a target commit that
/// cannot be resolved.
#[instrument(skip_all, fields(work_dir = %binding.work_dir(), %version))]
pub fn write_version<G: Git>(
    binding: &Binding,
    git: &G,
    version: &Version,
    source: &RefSource,
    metadata: &BuildMetadata,
) -> DriverResult<PublishOutcome> {
    let dir = Some(binding.work_dir());
    let message = metadata.message();

    run_checked(git, dir, &["fetch", "--tags", "--dry-run", "--depth=1"])?;
    debug!(state = "fetched", "remote reachable");

    let commit = resolve_commit(binding, git, source)?;
    debug!(state = "ref-resolved", %commit, "resolved target commit");

    let tag = TagName::new(binding.prefix(), version);
    run_checked(
        git,
        dir,
        &["tag", "--force", "--annotate", "--message", &message, tag.as_str(), &commit],
    )?;
    debug!(state = "tagged-locally", %tag, "tagged");

    let ref_name = tag.ref_name();
    let existing = run_checked(git, dir, &["ls-remote", "origin", &ref_name])?;
    if lists_ref(&existing, &ref_name) {
        info!(%tag, "remote already has tag, deleting it first");
        run_checked(git, dir, &["push", "origin", &tag.delete_refspec()])?;
    }
    debug!(state = "remote-reconciled", %tag, "remote reconciled");

    let push_args = ["push", "origin", tag.as_str()];
    let push = git.run(dir, &push_args)?;
    if let Some(reason) = Rejection::classify(&push.output) {
        warn!(%tag, %reason, output = %push.output.trim_end(), "tag push rejected");
        return Ok(PublishOutcome::Rejected { tag, reason });
    }
    push.into_result(&push_args)?;

    info!(state = "pushed", %tag, %commit, "published");
    Ok(PublishOutcome::Published { tag, commit })
}

/// Resolve the commit a new tag should point at.
#[instrument(level = "debug", skip(binding, git))]
fn resolve_commit<G: Git>(binding: &Binding, git: &G, source: &RefSource) -> DriverResult<String> {
    match source {
        RefSource::Repository(path) => {
            info!(repository = %path, "using the HEAD commit of another repository");
            head_of_repository(git, path)
        }
        RefSource::Remote => {
            let at = binding.branch().unwrap_or("HEAD");
            info!(%at, "using the latest commit on origin");
            let listing = run_checked(git, Some(binding.work_dir()), &["ls-remote", "origin", at])?;
            first_hash(&listing).ok_or_else(|| DriverError::RefNotFound(at.to_string()))
        }
    }
}

/// `HEAD` of the repository checked out at `path`.
fn head_of_repository<G: Git>(git: &G, path: &Utf8Path) -> DriverResult<String> {
    let git_dir = format!("--git-dir={}", path.join(".git"));
    let output = run_checked(git, None, &[&git_dir, "log", "-1", "--pretty=format:\"%H\""])?;
    parse_quoted_hash(&output).ok_or_else(|| {
        warn!(output = %output.trim_end(), "unexpected git log output");
        DriverError::InvalidCommitHash(output.trim().to_string())
    })
}

/// The hash column of the first `ls-remote` line.
fn first_hash(listing: &str) -> Option<String> {
    let line = listing.lines().find(|l| !l.trim().is_empty())?;
    let hash = line.split('\t').next()?.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

/// Unquote `"<hash>"` and check it looks like a SHA-1 or SHA-256 object id.
fn parse_quoted_hash(output: &str) -> Option<String> {
    let hash = output.trim().strip_prefix('"')?.strip_suffix('"')?;
    let valid = matches!(hash.len(), 40 | 64) && hash.bytes().all(|b| b.is_ascii_hexdigit());
    valid.then(|| hash.to_string())
}

/// Whether `ls-remote` output lists exactly `ref_name` (or its peeled form).
fn lists_ref(listing: &str, ref_name: &str) -> bool {
    let peeled = format!("{ref_name}^{{}}");
    listing
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .map(str::trim)
        .any(|name| name == ref_name || name == peeled)
}

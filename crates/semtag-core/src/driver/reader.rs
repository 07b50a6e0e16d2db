//! Version reader: the highest version among the prefixed tags.

use semver::Version;
use tracing::{debug, info, instrument, warn};

use super::{Binding, DriverResult, run_checked};
use crate::git::Git;
use crate::outcome::EmptyRepository;
use crate::version::current_version;

/// Fetch tags and return the highest `<prefix><semver>` tag.
///
/// If a branch is bound, only tags merged into `origin/<branch>` count.
///
/// Returns `Ok(None)` when the listing fails because the repository has no
/// tags or no commits yet. That is different from `Ok(Some(0.0.0))`, which
/// means the listing succeeded (possibly with no matching tags, or with a
/// real `v0.0.0` tag).
///
/// # Errors
///
/// A failed fetch, any other listing failure, and any listed tag that is not
/// `<prefix><semver>` are errors.
#[instrument(skip_all, fields(work_dir = %binding.work_dir(), prefix = binding.prefix(), branch = ?binding.branch()))]
pub fn read_version<G: Git>(binding: &Binding, git: &G) -> DriverResult<Option<Version>> {
    let dir = Some(binding.work_dir());

    run_checked(git, dir, &["fetch", "--tags"])?;
    debug!("fetched tags");

    let merged = binding.branch().map(|branch| format!("--merged=origin/{branch}"));
    let pattern = format!("{}*", binding.prefix());
    let mut args = vec!["tag"];
    if let Some(ref merged) = merged {
        args.push(merged);
    }
    args.extend(["-l", pattern.as_str()]);

    let listing = git.run(dir, &args)?;
    if !listing.success
        && let Some(reason) = EmptyRepository::classify(&listing.output)
    {
        info!(?reason, output = %listing.output.trim_end(), "no version tags yet");
        return Ok(None);
    }
    let listing = listing.into_result(&args)?;

    let version = current_version(binding.prefix(), &listing).inspect_err(|err| {
        warn!(error = %err, output = %listing.trim_end(), "could not parse tag listing");
    })?;

    info!(%version, "current version");
    Ok(Some(version))
}

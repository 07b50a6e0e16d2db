//! End-to-end driver tests against real `git`.
//!
//! Each test builds a bare "remote" plus a clone in a temp dir. Tests are
//! skipped (they pass without asserting) when `git` is not on `PATH`.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use semtag_core::annotation::BuildMetadata;
use semtag_core::driver::binding::Origin;
use semtag_core::driver::{GitTagDriver, PublishOutcome, RefSource};
use semtag_core::outcome::Rejection;
use semtag_core::SourceConfig;
use semtag_core::semver::Version;
use tempfile::TempDir;

struct Fixture {
    tmp: TempDir,
    remote: Utf8PathBuf,
    clone: Utf8PathBuf,
}

/// Run git in `dir`, panicking on failure, returning trimmed stdout.
fn git(dir: &Utf8Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn set_identity(dir: &Utf8Path) {
    git(dir, &["config", "user.name", "semtag tests"]);
    git(dir, &["config", "user.email", "tests@semtag.invalid"]);
    git(dir, &["config", "tag.gpgSign", "false"]);
    git(dir, &["config", "commit.gpgSign", "false"]);
}

fn commit(dir: &Utf8Path, message: &str) -> String {
    git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

/// A bare remote whose `main` has one commit, and a clone tracking it.
fn fixture() -> Option<Fixture> {
    if which::which("git").is_err() {
        eprintln!("skipping: git not installed");
        return None;
    }
    let tmp = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
    let remote = root.join("remote.git");
    let clone = root.join("clone");

    git(&root, &["init", "-q", "--bare", remote.as_str()]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    git(&root, &["init", "-q", clone.as_str()]);
    git(&clone, &["checkout", "-q", "-b", "main"]);
    set_identity(&clone);
    git(&clone, &["remote", "add", "origin", remote.as_str()]);
    commit(&clone, "initial");
    git(&clone, &["push", "-q", "origin", "main"]);

    Some(Fixture { tmp, remote, clone })
}

fn metadata() -> BuildMetadata {
    BuildMetadata {
        pipeline: "app".into(),
        job: "release".into(),
        build: "1".into(),
    }
}

fn local_driver(fx: &Fixture, branch: Option<&str>) -> GitTagDriver {
    let source = SourceConfig {
        repository: Some(fx.clone.clone()),
        branch: branch.map(str::to_string),
        ..SourceConfig::default()
    };
    GitTagDriver::set_up(&source).unwrap().with_metadata(metadata())
}

fn remote_tag_commit(fx: &Fixture, tag: &str) -> String {
    git(&fx.remote, &["rev-parse", &format!("{tag}^{{commit}}")])
}

#[test]
fn published_version_is_read_back() {
    let Some(fx) = fixture() else { return };
    let driver = local_driver(&fx, Some("main"));
    let head = git(&fx.clone, &["rev-parse", "HEAD"]);

    assert_eq!(driver.read_version().unwrap(), Some(Version::new(0, 0, 0)));

    let outcome = driver
        .write_version(&Version::new(1, 2, 0), &RefSource::Remote)
        .unwrap();
    match outcome {
        PublishOutcome::Published { ref tag, ref commit } => {
            assert_eq!(tag.as_str(), "v1.2.0");
            assert_eq!(commit, &head);
        }
        PublishOutcome::Rejected { .. } => panic!("unexpected rejection: {outcome:?}"),
    }

    assert_eq!(driver.read_version().unwrap(), Some(Version::new(1, 2, 0)));
    assert_eq!(remote_tag_commit(&fx, "v1.2.0"), head);
    let message = git(&fx.clone, &["tag", "-l", "--format=%(contents)", "v1.2.0"]);
    assert_eq!(message, "Pipeline: app\nJob: release\nBuild: 1");
}

#[test]
fn publishing_twice_is_idempotent() {
    let Some(fx) = fixture() else { return };
    let driver = local_driver(&fx, None);
    let head = git(&fx.clone, &["rev-parse", "HEAD"]);

    for _ in 0..2 {
        let outcome = driver
            .write_version(&Version::new(1, 0, 0), &RefSource::Remote)
            .unwrap();
        assert!(outcome.is_published(), "{outcome:?}");
        assert_eq!(remote_tag_commit(&fx, "v1.0.0"), head);
    }

    let tags = git(&fx.remote, &["tag", "-l"]);
    assert_eq!(tags, "v1.0.0");
}

#[test]
fn republishing_moves_the_tag_to_the_new_head() {
    let Some(fx) = fixture() else { return };
    let driver = local_driver(&fx, Some("main"));

    driver
        .write_version(&Version::new(1, 0, 0), &RefSource::Remote)
        .unwrap();
    let next = commit(&fx.clone, "fix");
    git(&fx.clone, &["push", "-q", "origin", "main"]);

    let outcome = driver
        .write_version(&Version::new(1, 0, 0), &RefSource::Remote)
        .unwrap();

    assert!(outcome.is_published());
    assert_eq!(remote_tag_commit(&fx, "v1.0.0"), next);
}

#[test]
fn real_zero_tag_reads_as_zero() {
    let Some(fx) = fixture() else { return };
    git(&fx.clone, &["tag", "v0.0.0"]);

    let version = local_driver(&fx, None).read_version().unwrap();
    assert_eq!(version, Some(Version::new(0, 0, 0)));
}

#[test]
fn highest_version_wins_regardless_of_creation_order() {
    let Some(fx) = fixture() else { return };
    for tag in ["v2.10.0", "v2.9.1", "v2.10.2", "v2.10.2-rc.1", "v2.8.1"] {
        git(&fx.clone, &["tag", tag]);
    }

    let version = local_driver(&fx, None).read_version().unwrap();
    assert_eq!(version, Some(Version::new(2, 10, 2)));
}

#[test]
fn branch_filter_ignores_tags_not_merged() {
    let Some(fx) = fixture() else { return };
    git(&fx.clone, &["tag", "v1.1.0"]);
    git(&fx.clone, &["checkout", "-q", "-b", "feature"]);
    commit(&fx.clone, "feature work");
    git(&fx.clone, &["tag", "v2.0.0"]);
    git(&fx.clone, &["push", "-q", "origin", "feature", "--tags"]);
    git(&fx.clone, &["checkout", "-q", "main"]);

    assert_eq!(
        local_driver(&fx, Some("main")).read_version().unwrap(),
        Some(Version::new(1, 1, 0))
    );
    assert_eq!(
        local_driver(&fx, Some("feature")).read_version().unwrap(),
        Some(Version::new(2, 0, 0))
    );
    assert_eq!(
        local_driver(&fx, None).read_version().unwrap(),
        Some(Version::new(2, 0, 0))
    );
}

#[test]
fn uri_source_creates_then_reuses_work_dir() {
    let Some(fx) = fixture() else { return };
    let work_dir = Utf8PathBuf::try_from(fx.tmp.path().join("work")).unwrap();
    let source = SourceConfig {
        uri: Some(fx.remote.to_string()),
        work_dir: Some(work_dir.clone()),
        branch: Some("main".into()),
        prefix: "rel-".into(),
        ..SourceConfig::default()
    };

    let driver = GitTagDriver::set_up(&source).unwrap().with_metadata(metadata());
    assert_eq!(driver.binding().origin(), Origin::Initialized);
    assert_eq!(git(&work_dir, &["remote", "get-url", "origin"]), fx.remote.as_str());
    set_identity(&work_dir);

    assert_eq!(driver.read_version().unwrap(), Some(Version::new(0, 0, 0)));
    let outcome = driver
        .write_version(&Version::parse("0.1.0-beta.1").unwrap(), &RefSource::Remote)
        .unwrap();
    assert!(outcome.is_published());
    assert_eq!(outcome.tag().as_str(), "rel-0.1.0-beta.1");

    let again = GitTagDriver::set_up(&source).unwrap();
    assert_eq!(again.binding().origin(), Origin::Reused);
    assert_eq!(
        again.read_version().unwrap(),
        Some(Version::parse("0.1.0-beta.1").unwrap())
    );
}

#[test]
fn repository_ref_source_tags_that_checkouts_head() {
    let Some(fx) = fixture() else { return };
    let work_dir = Utf8PathBuf::try_from(fx.tmp.path().join("work")).unwrap();
    let source = SourceConfig {
        uri: Some(fx.remote.to_string()),
        work_dir: Some(work_dir.clone()),
        ..SourceConfig::default()
    };
    let driver = GitTagDriver::set_up(&source).unwrap().with_metadata(metadata());
    set_identity(&work_dir);
    driver.read_version().unwrap();

    let head = git(&fx.clone, &["rev-parse", "HEAD"]);
    let outcome = driver
        .write_version(
            &Version::new(3, 0, 0),
            &RefSource::Repository(fx.clone.clone()),
        )
        .unwrap();

    assert_eq!(
        outcome,
        PublishOutcome::Published {
            tag: outcome.tag().clone(),
            commit: head.clone(),
        }
    );
    assert_eq!(remote_tag_commit(&fx, "v3.0.0"), head);
}

#[test]
fn missing_local_repository_is_an_error() {
    let Some(fx) = fixture() else { return };
    let source = SourceConfig {
        repository: Some(Utf8PathBuf::try_from(fx.tmp.path().join("nope")).unwrap()),
        ..SourceConfig::default()
    };
    assert!(GitTagDriver::set_up(&source).is_err());
}

#[cfg(unix)]
#[test]
fn hook_rejection_is_an_outcome() {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    let Some(fx) = fixture() else { return };
    let hook = Path::new(fx.remote.as_str()).join("hooks").join("pre-receive");
    std::fs::write(&hook, "#!/bin/sh\necho 'tags are frozen' >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();

    let outcome = local_driver(&fx, None)
        .write_version(&Version::new(1, 0, 0), &RefSource::Remote)
        .unwrap();

    assert!(matches!(
        outcome,
        PublishOutcome::Rejected {
            reason: Rejection::RemoteRejected,
            ..
        }
    ));
    assert_eq!(git(&fx.remote, &["tag", "-l"]), "");
}

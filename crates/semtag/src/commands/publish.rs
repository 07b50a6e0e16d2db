//! Publish command: thin CLI layer over `GitTagDriver::write_version`.

use std::io::IsTerminal;

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use inquire::Confirm;
use owo_colors::Style;
use tracing::{debug, info, instrument};

use semtag_core::config::Config;
use semtag_core::driver::{PublishOutcome, RefSource};
use semtag_core::semver::Version;
use semtag_core::version::{self, TagName};

use super::{highlight, label, paint};

/// Arguments for the `publish` subcommand.
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Version to publish (e.g., "1.2.3", or "v1.2.3" with the tag prefix)
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Tag the HEAD commit of this checkout instead of the remote branch head
    #[arg(long, value_name = "PATH")]
    pub repo: Option<Utf8PathBuf>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Execute the publish command.
///
/// A rejected push is reported but still exits successfully: another
/// publisher won the race and the remote is consistent.
#[instrument(name = "cmd_publish", skip_all, fields(version = %args.version))]
pub fn cmd_publish(args: PublishArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, repo = ?args.repo, "executing publish command");

    let prefix = config.source.effective_prefix();
    let version = parse_requested(prefix, &args.version)?;
    let tag = TagName::new(prefix, &version);
    let source = args
        .repo
        .clone()
        .map_or(RefSource::Remote, RefSource::Repository);

    let driver = super::set_up_driver(config)?;

    if should_confirm(&args, global_json, config) {
        let target = match source {
            RefSource::Remote => format!(
                "origin/{}",
                driver.binding().branch().unwrap_or("HEAD")
            ),
            RefSource::Repository(ref path) => format!("HEAD of {path}"),
        };
        println!(
            "{}: {} → {}",
            paint("Publish", Style::new().bold()),
            paint(&tag, Style::new().green().bold()),
            highlight(&target)
        );
        let confirmed = Confirm::new("Create and push this tag?")
            .with_default(true)
            .prompt()
            .context("confirmation prompt failed")?;
        if !confirmed {
            println!("{}", paint("Publish cancelled.", Style::new().yellow()));
            return Ok(());
        }
    }

    let spinner = super::spinner(&format!("Publishing {tag}..."), global_json);
    let outcome = driver.write_version(&version, &source);
    spinner.finish_and_clear();
    let outcome = outcome.context("publish failed")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        PublishOutcome::Published { tag, commit } => {
            info!(%tag, %commit, "tag published");
            println!(
                "{} published {} at {}",
                paint("✓", Style::new().green().bold()),
                paint(&tag, Style::new().green().bold()),
                label(&commit)
            );
        }
        PublishOutcome::Rejected { tag, reason } => {
            println!(
                "{} rejected {} ({})",
                paint("○", Style::new().yellow()),
                paint(&tag, Style::new().yellow().bold()),
                reason
            );
        }
    }
    Ok(())
}

/// Parse the requested version, accepting it with or without the tag prefix.
fn parse_requested(prefix: &str, raw: &str) -> anyhow::Result<Version> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("version must not be empty");
    }
    if raw.starts_with(prefix)
        && let Ok(version) = version::parse_tag(prefix, raw)
    {
        return Ok(version);
    }
    Version::parse(raw).with_context(|| format!("invalid version {raw:?}"))
}

fn should_confirm(args: &PublishArgs, global_json: bool, config: &Config) -> bool {
    let config_confirm = config
        .publish
        .as_ref()
        .and_then(|p| p.confirm)
        .unwrap_or(true);
    config_confirm && !args.yes && !global_json && std::io::stdin().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use semtag_core::config::PublishConfig;

    #[test]
    fn parses_bare_version() {
        assert_eq!(parse_requested("v", "1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn strips_tag_prefix() {
        assert_eq!(parse_requested("v", "v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(
            parse_requested("release-", "release-2.0.0-rc.1").unwrap(),
            Version::parse("2.0.0-rc.1").unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_requested("v", "").is_err());
        assert!(parse_requested("v", "vnext").is_err());
        assert!(parse_requested("v", "1.2").is_err());
    }

    #[test]
    fn yes_flag_skips_confirmation() {
        let args = PublishArgs {
            version: "1.0.0".into(),
            yes: true,
            ..PublishArgs::default()
        };
        assert!(!should_confirm(&args, false, &Config::default()));
    }

    #[test]
    fn json_and_config_skip_confirmation() {
        let args = PublishArgs {
            version: "1.0.0".into(),
            ..PublishArgs::default()
        };
        assert!(!should_confirm(&args, true, &Config::default()));

        let config = Config {
            publish: Some(PublishConfig {
                confirm: Some(false),
            }),
            ..Config::default()
        };
        assert!(!should_confirm(&args, false, &config));
    }
}

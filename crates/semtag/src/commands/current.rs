//! Current command: print the highest published version.

use clap::Args;
use owo_colors::Style;
use serde::Serialize;
use tracing::{debug, instrument};

use semtag_core::config::Config;
use semtag_core::semver::Version;
use semtag_core::version::TagName;

use super::paint;

/// Arguments for the `current` subcommand.
#[derive(Args, Debug, Default)]
pub struct CurrentArgs {
    /// Print `0.0.0` instead of `none` when no version tag exists
    #[arg(long)]
    pub or_zero: bool,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct CurrentReport {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<TagName>,
}

impl CurrentReport {
    fn new(prefix: &str, version: Option<&Version>) -> Self {
        Self {
            found: version.is_some(),
            version: version.map(ToString::to_string),
            tag: version.map(|v| TagName::new(prefix, v)),
        }
    }
}

/// Read and print the current version.
///
/// Not finding any version tag is not an error: the text output is `none`
/// (or `0.0.0` with `--or-zero`) and JSON output has `"found": false`.
#[instrument(name = "cmd_current", skip_all)]
pub fn cmd_current(args: CurrentArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, or_zero = args.or_zero, "executing current command");

    let driver = super::set_up_driver(config)?;
    let spinner = super::spinner("Reading version tags...", global_json);
    let version = driver.read_version();
    spinner.finish_and_clear();
    let version = version?;

    let report = CurrentReport::new(driver.binding().prefix(), version.as_ref());
    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match (report.version, args.or_zero) {
        (Some(version), _) => println!("{}", paint(version, Style::new().green())),
        (None, true) => println!("{}", Version::new(0, 0, 0)),
        (None, false) => println!("{}", paint("none", Style::new().yellow())),
    }
    Ok(())
}

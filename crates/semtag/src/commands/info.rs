//! Info command: show package and effective configuration.

use clap::Args;
use owo_colors::Style;
use serde::Serialize;
use tracing::{debug, instrument};

use semtag_core::config::{self, Config};

use super::{heading, highlight, label, paint};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    source: SourceInfo,
}

#[derive(Serialize)]
struct SourceInfo {
    prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        let source = &config.source;
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            source: SourceInfo {
                prefix: source.effective_prefix().to_string(),
                uri: source.uri.clone(),
                repository: source.repository.as_ref().map(|p| p.to_string()),
                branch: source.branch().map(str::to_string),
            },
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "{} {}",
        paint(info.package.name, Style::new().bold()),
        paint(info.package.version, Style::new().green())
    );
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", label("License"), info.package.license);
    }

    println!();
    println!("{}", heading("Configuration"));
    if let Some(ref path) = info.config.config_file {
        println!("{}: {}", label("Config file"), highlight(path));
    } else {
        println!(
            "{}: {}",
            label("Config file"),
            paint("none loaded", Style::new().yellow())
        );
    }
    println!("{}: {}", label("Log level"), info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("{}: {}", label("Log directory"), dir);
    }

    println!();
    println!("{}", heading("Source"));
    let source = &info.config.source;
    match (&source.uri, &source.repository) {
        (Some(uri), _) => println!("{}: {}", label("Remote"), highlight(uri)),
        (None, Some(path)) => println!("{}: {}", label("Repository"), highlight(path)),
        (None, None) => println!("  {}", paint("○ No source configured", Style::new().yellow())),
    }
    println!("{}: {}", label("Tag prefix"), source.prefix);
    if let Some(ref branch) = source.branch {
        println!("{}: {}", label("Branch"), branch);
    }

    Ok(())
}

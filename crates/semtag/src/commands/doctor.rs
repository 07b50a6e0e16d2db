//! Doctor command: diagnose configuration and environment.

use clap::Args;
use inquire::Confirm;
use owo_colors::Style;
use serde::Serialize;
use tracing::{debug, instrument};

use semtag_core::annotation::{ENV_BUILD, ENV_JOB, ENV_PIPELINE};
use semtag_core::config::{self, Config};
use semtag_core::git::{self, Git, SystemGit};

use super::{heading, highlight, label, paint};

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct DoctorReport {
    directories: DirectoryPaths,
    config: ConfigStatus,
    git: GitStatus,
    source: SourceStatus,
    environment: EnvironmentInfo,
}

#[derive(Serialize)]
struct DirectoryPaths {
    config: Option<String>,
    cache: Option<String>,
    data_local: Option<String>,
}

#[derive(Serialize)]
struct ConfigStatus {
    /// Path to loaded config file, if any
    file: Option<String>,
    /// Whether a config file was found
    found: bool,
}

#[derive(Serialize)]
struct GitStatus {
    installed: bool,
    version: Option<String>,
}

#[derive(Serialize)]
struct SourceStatus {
    prefix: String,
    uri: Option<String>,
    repository: Option<String>,
    branch: Option<String>,
    work_dir: Option<String>,
    /// What is wrong with the source settings, if anything
    problem: Option<&'static str>,
}

#[derive(Serialize)]
struct EnvironmentInfo {
    /// Current working directory
    cwd: Option<String>,
    /// Relevant environment variables
    env_vars: Vec<EnvVar>,
}

#[derive(Serialize)]
struct EnvVar {
    name: &'static str,
    value: Option<String>,
    description: &'static str,
}

const ENV_VARS: &[(&str, &str)] = &[
    ("XDG_CONFIG_HOME", "Override config directory"),
    ("XDG_CACHE_HOME", "Override cache directory"),
    ("RUST_LOG", "Log filter directive"),
    ("SEMTAG_LOG_PATH", "JSONL log file"),
    ("SEMTAG_LOG_DIR", "JSONL log directory"),
    ("SEMTAG_URI", "Source remote URI"),
    ("SEMTAG_REPOSITORY", "Source local repository"),
    ("SEMTAG_BRANCH", "Source branch filter"),
    ("SEMTAG_PREFIX", "Tag prefix"),
    ("SEMTAG_WORK_DIR", "Working copy for a remote source"),
    (ENV_PIPELINE, "Tag annotation: pipeline"),
    (ENV_JOB, "Tag annotation: job"),
    (ENV_BUILD, "Tag annotation: build"),
];

impl DoctorReport {
    fn gather(cwd: &camino::Utf8Path, config: &Config) -> Self {
        let config_file = config::find_project_config(cwd);

        Self {
            directories: DirectoryPaths {
                config: config::user_config_dir().map(|p| p.to_string()),
                cache: config::user_cache_dir().map(|p| p.to_string()),
                data_local: config::user_data_local_dir().map(|p| p.to_string()),
            },
            config: ConfigStatus {
                found: config_file.is_some(),
                file: config_file.map(|p| p.to_string()),
            },
            git: GitStatus::probe(),
            source: SourceStatus::from_config(config),
            environment: EnvironmentInfo {
                cwd: Some(cwd.to_string()),
                env_vars: ENV_VARS
                    .iter()
                    .map(|&(name, description)| EnvVar {
                        name,
                        value: std::env::var(name).ok(),
                        description,
                    })
                    .collect(),
            },
        }
    }
}

impl GitStatus {
    fn probe() -> Self {
        if !git::is_installed() {
            return Self {
                installed: false,
                version: None,
            };
        }
        let version = SystemGit
            .run(None, &["--version"])
            .ok()
            .filter(|out| out.success)
            .map(|out| out.output.trim().to_string());
        Self {
            installed: true,
            version,
        }
    }
}

impl SourceStatus {
    fn from_config(config: &Config) -> Self {
        let source = &config.source;
        let uri = source.uri.clone().filter(|u| !u.is_empty());
        let repository = source
            .repository
            .as_ref()
            .filter(|p| !p.as_str().is_empty())
            .map(ToString::to_string);
        let problem = match (&uri, &repository) {
            (Some(_), Some(_)) => Some("both uri and repository are set"),
            (None, None) => Some("neither uri nor repository is set"),
            _ => None,
        };
        let work_dir = if uri.is_some() {
            source.effective_work_dir().map(|p| p.to_string())
        } else {
            None
        };
        Self {
            prefix: source.effective_prefix().to_string(),
            uri,
            repository,
            branch: source.branch().map(str::to_string),
            work_dir,
            problem,
        }
    }
}

/// Run diagnostics and report configuration status.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `cwd` - Current working directory
/// * `config` - Loaded configuration, with CLI source overrides applied
#[instrument(name = "cmd_doctor", skip_all, fields(json_output))]
pub fn cmd_doctor(
    _args: DoctorArgs,
    global_json: bool,
    cwd: &camino::Utf8Path,
    config: &Config,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing doctor command");

    let spinner = super::spinner("Gathering diagnostics...", global_json);
    let report = DoctorReport::gather(cwd, config);
    spinner.finish_and_clear();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", heading("Configuration"));
    if report.config.found {
        println!(
            "  {} Config file: {}",
            paint("✓", Style::new().green()),
            highlight(report.config.file.as_deref().unwrap_or(""))
        );
    } else {
        println!("  {} No config file found", paint("○", Style::new().yellow()));
        offer_config_creation()?;
    }
    println!();

    println!("{}", heading("Git"));
    match (report.git.installed, report.git.version.as_deref()) {
        (true, Some(version)) => {
            println!("  {} {}", paint("✓", Style::new().green()), highlight(version));
        }
        (true, None) => {
            println!("  {} git found, version unknown", paint("○", Style::new().yellow()));
        }
        (false, _) => println!("  {} git not found on PATH", paint("✗", Style::new().red())),
    }
    println!();

    println!("{}", heading("Source"));
    let source = &report.source;
    match source.problem {
        Some(problem) => println!("  {} {}", paint("✗", Style::new().red()), problem),
        None => {
            if let Some(ref uri) = source.uri {
                println!("  {}: {}", label("Remote"), highlight(uri));
                print_dir("  Working copy", &source.work_dir);
            }
            if let Some(ref repository) = source.repository {
                println!("  {}: {}", label("Repository"), highlight(repository));
            }
        }
    }
    println!("  {}: {}", label("Prefix"), source.prefix);
    if let Some(ref branch) = source.branch {
        println!("  {}: {}", label("Branch"), branch);
    }
    println!();

    println!("{}", heading("Directories"));
    print_dir("  Config", &report.directories.config);
    print_dir("  Cache", &report.directories.cache);
    print_dir("  Data (local)", &report.directories.data_local);
    println!();

    println!("{}", heading("Environment"));
    println!("  {}: {}", label("Working directory"), highlight(cwd));

    let set_vars: Vec<_> = report
        .environment
        .env_vars
        .iter()
        .filter(|v| v.value.is_some())
        .collect();

    if set_vars.is_empty() {
        println!("  {} No overrides set", label("○"));
    } else {
        for var in set_vars {
            println!(
                "  {}: {}",
                label(var.name),
                highlight(var.value.as_deref().unwrap_or(""))
            );
        }
    }

    Ok(())
}

fn print_dir(name: &str, path: &Option<String>) {
    print!("{}: ", label(name));
    match path {
        Some(p) => println!("{}", highlight(p)),
        None => println!("{}", paint("(unavailable)", Style::new().yellow())),
    }
}

/// Offer to create a default config file when none exists.
fn offer_config_creation() -> anyhow::Result<()> {
    let Some(config_dir) = config::user_config_dir() else {
        return Ok(());
    };

    let config_path = config_dir.join("config.yaml");

    // Don't prompt if running non-interactively
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Ok(());
    }

    let create = Confirm::new("Create a default config file?")
        .with_default(false)
        .with_help_message(&format!("Will create {config_path}"))
        .prompt();

    if let Ok(true) = create {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_saphyr::to_string(&Config::default())?;
        std::fs::write(&config_path, yaml)?;

        println!(
            "  {} Created {}",
            paint("✓", Style::new().green()),
            highlight(&config_path)
        );
    }

    Ok(())
}

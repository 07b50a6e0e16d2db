//! Setup command: bind the repository and report where it lives.

use clap::Args;
use owo_colors::Style;
use tracing::{debug, instrument};

use semtag_core::config::Config;
use semtag_core::driver::binding::Origin;

use super::{highlight, label, paint};

/// Arguments for the `setup` subcommand.
#[derive(Args, Debug, Default)]
pub struct SetupArgs {
    // No subcommand-specific arguments; uses global --json flag
}

/// Resolve the working copy, creating it for a remote source if needed.
#[instrument(name = "cmd_setup", skip_all)]
pub fn cmd_setup(_args: SetupArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing setup command");

    let driver = super::set_up_driver(config)?;
    let binding = driver.binding();

    if global_json {
        println!("{}", serde_json::to_string_pretty(binding)?);
        return Ok(());
    }

    let how = match binding.origin() {
        Origin::LocalPath => "local repository",
        Origin::Reused => "existing working copy",
        Origin::Initialized => "new working copy",
    };
    println!(
        "{} {} ({})",
        paint("✓", Style::new().green()),
        highlight(binding.work_dir()),
        label(how)
    );
    println!("{}: {}", label("Prefix"), binding.prefix());
    if let Some(branch) = binding.branch() {
        println!("{}: {}", label("Branch"), branch);
    }
    Ok(())
}

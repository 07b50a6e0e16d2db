//! Command implementations

pub mod current;

pub mod doctor;

pub mod info;

pub mod publish;

pub mod setup;

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream, Style};
use semtag_core::config::Config;
use semtag_core::driver::GitTagDriver;

/// Set up the driver for the configured source.
///
/// Shared by every command that touches the repository.
pub fn set_up_driver(config: &Config) -> anyhow::Result<GitTagDriver> {
    GitTagDriver::set_up(&config.source).context("failed to set up the repository")
}

/// Style `value` for stdout.
///
/// Under `--color auto` the style is dropped unless stdout is a color
/// terminal (and `NO_COLOR` is unset), so piped output stays plain.
pub fn paint(value: impl Display, style: Style) -> String {
    value
        .if_supports_color(Stream::Stdout, |v| v.style(style))
        .to_string()
}

/// A bold, underlined section heading.
pub fn heading(text: &str) -> String {
    paint(text, Style::new().bold().underline())
}

/// A dimmed field label.
pub fn label(text: impl Display) -> String {
    paint(text, Style::new().dimmed())
}

/// A highlighted value: paths, URIs, versions.
pub fn highlight(text: impl Display) -> String {
    paint(text, Style::new().cyan())
}

/// A spinner on stderr while git talks to the remote.
///
/// Hidden for `--json` and when stderr is not a terminal, so nothing ends up
/// in captured output.
pub fn spinner(message: &str, global_json: bool) -> ProgressBar {
    if global_json || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

//! Core library for semtag.
//!
//! Treats a git repository's `<prefix><semver>` tags as a version source:
//! read the highest published version, and publish a new one as an
//! annotated tag pushed to `origin`.
//!
//! # Modules
//!
//! - [`annotation`] - CI build metadata written into tag messages
//! - [`config`] - Configuration loading and management
//! - [`driver`] - Repository binding, version reader and version writer
//! - [`error`] - Configuration error types
//! - [`git`] - Running git commands
//! - [`outcome`] - Recognized git failure output
//! - [`version`] - Tag naming and version selection
//!
//! # Quick Start
//!
//! ```no_run
//! use semtag_core::ConfigLoader;
//! use semtag_core::driver::GitTagDriver;
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! let driver = GitTagDriver::set_up(&config.source).expect("set up");
//! match driver.read_version().expect("read") {
//!     Some(version) => println!("current: {version}"),
//!     None => println!("no tags yet"),
//! }
//! ```
#![deny(unsafe_code)]

pub mod annotation;

pub mod config;

pub mod driver;

pub mod error;

pub mod git;

pub mod outcome;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel, SourceConfig};

pub use driver::{Binding, DriverError, DriverResult, GitTagDriver, PublishOutcome, RefSource};

pub use error::{ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;

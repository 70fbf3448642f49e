//! # quire-cli
//!
//! Command-line front end for Quire. The `quire` binary wires these modules
//! together:
//!
//! - [`cli`]: argument definitions
//! - [`settings`]: project root and configuration layering
//! - [`commands`]: one handler per subcommand
//! - [`error`]: command errors and exit codes

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod settings;

pub use cli::{Cli, Command};
pub use error::{Error, Result};
pub use settings::Settings;

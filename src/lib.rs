//! Flexdot dotfile linker.
//!
//! Reads a nested YAML index that maps paths in a dotfiles repository to
//! directories under a home directory, and materializes it as symlinks.
//! Regular files that would be replaced are moved into time-bucketed backup
//! directories first.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: `config.yml` model and install parameter resolution
//! - **[`index`]**: index parsing and wildcard expansion into [`index::Entry`] values
//! - **[`resources`]**: symlink inspection and creation, backup buckets
//! - **[`engine`]**: the per-entry link state machine and its [`engine::Reporter`] seam
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `init`, `clear-backups`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod logging;
pub mod resources;

/// Version string: `FLEXDOT_VERSION` at build time, else the crate version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("FLEXDOT_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}

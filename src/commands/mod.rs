//! Subcommand orchestration: resolve parameters, then drive the core.
pub mod clear_backups;
pub mod init;
pub mod install;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::resources::fs::absolutize;

/// Environment variable naming the dotfiles root when `--root` is absent.
pub const ROOT_ENV: &str = "FLEXDOT_ROOT";

/// Resolve the dotfiles root: `--root`, then `$FLEXDOT_ROOT`, then the
/// current directory. The result is absolute.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined or the
/// resolved root is not a directory.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match (&global.root, std::env::var_os(ROOT_ENV)) {
        (Some(root), _) => root.clone(),
        (None, Some(env)) if !env.is_empty() => PathBuf::from(env),
        _ => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = absolutize(&root)
        .with_context(|| format!("cannot resolve dotfiles root {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("dotfiles root {} is not a directory", root.display());
    }
    Ok(root)
}

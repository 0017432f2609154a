use anyhow::Result;

use super::resolve_root;
use crate::cli::GlobalOpts;
use crate::config::{CONFIG_FILE, Config};
use crate::error::ConfigError;
use crate::logging::Logger;

/// Run the init command: write a default `config.yml` into the dotfiles root.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, `config.yml` already
/// exists, or the file cannot be written.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;

    log.stage("Initializing");
    if global.dry_run {
        let path = root.join(CONFIG_FILE);
        if path.symlink_metadata().is_ok() {
            return Err(ConfigError::AlreadyExists(path).into());
        }
        log.dry_run(&format!("would create {} with default values", path.display()));
        return Ok(());
    }

    let path = Config::write_default(&root)?;
    log.info(&format!("created {} with default values", path.display()));
    Ok(())
}

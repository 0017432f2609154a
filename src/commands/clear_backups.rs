use anyhow::Result;

use super::resolve_root;
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::resources::backup::BackupStore;

/// Run the clear-backups command: delete `<root>/backup` and everything in it.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the backup directory
/// exists but cannot be removed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let store = BackupStore::in_root(&root);
    let base = store.base_dir();

    log.stage("Clearing backups");
    if global.dry_run {
        let count = store.buckets().len();
        if base.exists() {
            log.dry_run(&format!("would remove {} ({count} buckets)", base.display()));
        } else {
            log.info(&format!("no backups at {}", base.display()));
        }
        return Ok(());
    }

    if store.clear_all()? {
        log.info(&format!("removed {}", base.display()));
    } else {
        log.info(&format!("no backups at {}", base.display()));
    }
    Ok(())
}

use anyhow::{Context as _, Result};

use super::resolve_root;
use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::{Config, resolve_install};
use crate::engine::LinkEngine;
use crate::index::{IndexTree, resolve};
use crate::logging::Logger;
use crate::resources::fs::absolutize;

/// Run the install command.
///
/// Configuration and index problems abort before anything is touched. Link
/// failures are reported per entry; the command fails after every entry has
/// been processed if any of them failed.
///
/// # Errors
///
/// Returns an error if the root, `config.yml`, or the index cannot be
/// loaded, if a required parameter is missing, or if any entry failed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    log.debug(&format!("flexdot {}", crate::version()));

    log.stage("Loading configuration");
    let config = Config::load(&root)?;
    if config.is_none() {
        log.debug("no config.yml found, using defaults");
    }
    let params = resolve_install(
        config.as_ref(),
        opts.home_dir.as_deref(),
        opts.index.as_deref(),
        &root,
    )?;
    let home_dir = absolutize(&params.home_dir)
        .with_context(|| format!("cannot resolve home_dir {}", params.home_dir.display()))?;
    log.info(&format!("dotfiles: {}", root.display()));
    log.info(&format!("home: {}", home_dir.display()));
    log.info(&format!("index: {}", params.index_file.display()));
    log.debug(&format!("keep_max_count: {}", params.keep_max_count));

    log.stage("Resolving index");
    let tree = IndexTree::load(&params.index_file)?;
    let entries = resolve(&tree, &root);
    log.info(&format!("{} {}", entries.len(), entries_noun(entries.len())));
    if entries.is_empty() {
        log.warn("index resolved to no entries");
    }

    log.stage(if global.dry_run {
        "Linking (dry run)"
    } else {
        "Linking"
    });
    let engine = LinkEngine::new(&root, &home_dir)
        .keep_max_count(params.keep_max_count)
        .dry_run(global.dry_run);
    let report = engine.apply(&entries, log);

    log.print_summary();

    let count = report.error_count;
    if count > 0 {
        anyhow::bail!("{count} {} failed", entries_noun(count));
    }
    Ok(())
}

const fn entries_noun(count: usize) -> &'static str {
    if count == 1 { "entry" } else { "entries" }
}

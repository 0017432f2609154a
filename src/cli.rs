use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for flexdot.
#[derive(Parser, Debug)]
#[command(
    name = "flexdot",
    about = "Symlink dotfiles from an index, backing up the files they replace",
    version = crate::version()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override dotfiles root directory (default: $FLEXDOT_ROOT, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link every entry of the index into the home directory
    Install(InstallOpts),
    /// Write a default config.yml into the dotfiles root
    Init,
    /// Delete all backups under the dotfiles root
    ClearBackups,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Init => "init",
            Self::ClearBackups => "clear-backups",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Destination root for links (overrides home_dir in config.yml)
    #[arg(short = 'H', long = "home_dir", value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    /// Index file (overrides index_yml in config.yml)
    #[arg(value_name = "INDEX")]
    pub index: Option<PathBuf>,
}

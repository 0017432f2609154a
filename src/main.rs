use anyhow::Result;
use clap::Parser;

use flexdot_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        println!("flexdot {}", flexdot_cli::version());
        return Ok(());
    }

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = logging::Logger::new(name);

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Init => commands::init::run(&args.global, &log),
        cli::Command::ClearBackups => commands::clear_backups::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    }
}

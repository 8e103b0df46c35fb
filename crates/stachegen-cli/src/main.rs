// stachegen CLI entry point

use clap::Parser;
use colored::Colorize;
use stachegen_cli::{init_logging, run, Args, Verbosity};

fn main() {
    let args = Args::parse();
    init_logging(Verbosity::from_flags(args.verbose, args.quiet));

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{} {}", "stachegen:".red().bold(), err.user_message());
        std::process::exit(err.exit_code());
    }
}

//! Logging and verbosity control

use tracing::Level;

/// Verbosity chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Resolver and generator progress
    Verbose,
}

impl Verbosity {
    /// Map the `-q` and `-v` flags; quiet wins
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Most detailed level that gets logged
    pub fn max_level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::ERROR,
            Verbosity::Normal => Level::WARN,
            Verbosity::Verbose => Level::DEBUG,
        }
    }
}

/// Install a stderr subscriber for `verbosity`
///
/// Standard output carries generated code, so log lines never go there.
/// Calling this twice keeps the first subscriber.
pub fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity.max_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stachegen_core::Target;

/// stachegen - compile mustache templates to Go or JavaScript
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stachegen")]
#[command(bin_name = "stachegen")]
#[command(about = "Compile mustache templates to Go or JavaScript source")]
#[command(
    long_about = "Compile a mustache template, with its partials and parent templates, into a single Go or JavaScript source file.\n\nPartials are read from the template's directory as NAME.mustache. A missing partial renders as nothing.\n\nGo output exports one function named after the template file: `user_card.mustache` becomes `UserCard`. Characters other than ASCII letters, digits and `_` become `_`, and a name that would not start with a letter gets a `T` prefix (`404.mustache` becomes `T404`).\n\nSettings come from ~/.config/stachegen/config.toml, ./stachegen.toml (or --config) and STACHEGEN_* environment variables; flags override all of them."
)]
#[command(version)]
pub struct Args {
    /// Template to compile; standard input when omitted
    #[arg(value_name = "TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Language to generate
    #[arg(short, long, value_enum)]
    pub lang: Option<Lang>,

    /// Package clause for generated Go code
    #[arg(long, value_name = "NAME")]
    pub go_package: Option<String>,

    /// Import path of the Go runtime package
    #[arg(long, value_name = "IMPORT_PATH")]
    pub go_runtime: Option<String>,

    /// Write the generated code to FILE instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Read settings from FILE instead of ./stachegen.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Log resolver and generator progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Target language as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// Go source using the mustache runtime package
    Go,
    /// A self-contained ES module
    Js,
}

impl From<Lang> for Target {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::Go => Target::Go,
            Lang::Js => Target::JavaScript,
        }
    }
}

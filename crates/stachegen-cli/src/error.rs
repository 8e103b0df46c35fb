//! CLI error types

use std::io;
use std::path::PathBuf;

use stachegen_core::CompileError;
use thiserror::Error;

/// Errors reported by the `stachegen` command
#[derive(Error, Debug)]
pub enum CliError {
    /// Neither a flag, the environment nor a config file chose a language
    #[error("no target language given")]
    MissingLanguage,

    /// A setting has a value we cannot use
    #[error("invalid setting {key}: {message}")]
    InvalidSetting {
        /// Setting name
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// Configuration files or environment could not be read
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Reading the template failed
    #[error("reading {}: {source}", path.display())]
    Read {
        /// Template path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Reading standard input failed
    #[error("reading standard input: {0}")]
    Stdin(#[source] io::Error),

    /// Writing the generated code failed
    #[error("writing {}: {source}", path.display())]
    Write {
        /// Output path, `-` for standard output
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Settings could not be rendered for `--show-config`
    #[error("rendering settings: {0}")]
    ShowConfig(#[from] toml::ser::Error),

    /// Parsing, partial resolution or generation failed
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl CliError {
    /// Message for the terminal, with a hint where one helps
    pub fn user_message(&self) -> String {
        match self {
            CliError::MissingLanguage => format!(
                "{}\n\nPass --lang go or --lang js, or set `lang` in stachegen.toml or STACHEGEN_LANG.",
                self
            ),
            CliError::InvalidSetting { key, .. } => format!(
                "{}\n\nCheck `{}` in stachegen.toml and the STACHEGEN_{} environment variable.",
                self,
                key,
                key.to_uppercase()
            ),
            CliError::Compile(CompileError::Parse(_)) => format!("template: {}", self),
            _ => self.to_string(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

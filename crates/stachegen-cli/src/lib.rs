//! The `stachegen` command
//!
//! Reads one template, resolves its partials from the template's directory
//! and writes Go or JavaScript source. [`run`] is the whole command; the
//! pieces it is built from are public so they can be driven from tests.

pub mod args;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use stachegen_core::{compile_with, CodeGenerator, Target};
use tracing::{debug, info};

pub use args::{Args, Lang};
pub use crate::config::{ConfigLoader, Settings};
pub use error::{CliError, CliResult};
pub use loader::FileLoader;
pub use logging::{init_logging, Verbosity};

/// Unit name used when the template comes from standard input
pub const STDIN_UNIT: &str = "stdin";

/// Settings with command-line flags applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Language to generate
    pub target: Target,
    /// Go package clause
    pub go_package: String,
    /// Go runtime import path
    pub go_runtime: String,
    /// Template file extension, without the dot
    pub extension: String,
}

impl Options {
    /// Apply `args` over `settings`; flags win
    pub fn resolve(args: &Args, settings: Settings) -> CliResult<Self> {
        let target = match (args.lang, settings.lang.as_deref()) {
            (Some(lang), _) => Target::from(lang),
            (None, Some(name)) => name.parse().map_err(|_| CliError::InvalidSetting {
                key: "lang".to_string(),
                message: format!("unknown language {:?}, expected go or js", name),
            })?,
            (None, None) => return Err(CliError::MissingLanguage),
        };
        Ok(Self {
            target,
            go_package: args.go_package.clone().unwrap_or(settings.go_package),
            go_runtime: args.go_runtime.clone().unwrap_or(settings.go_runtime),
            extension: settings.extension,
        })
    }

    /// Generator configured from these options
    pub fn generator(&self) -> CodeGenerator {
        CodeGenerator::new(self.target)
            .with_go_package(self.go_package.clone())
            .with_runtime_import(self.go_runtime.clone())
    }
}

/// Unit name for a template file: its file name minus `.extension`
pub fn unit_name(path: &Path, extension: &str) -> String {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", extension);
    match file.strip_suffix(suffix.as_str()) {
        Some(stem) if !extension.is_empty() => stem.to_string(),
        _ => file,
    }
}

/// Directory partials of `template` are loaded from
pub fn partial_dir(template: Option<&Path>) -> PathBuf {
    template
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Compile `source` with partials from `dir`
pub fn compile_source(
    source: &str,
    unit_name: &str,
    dir: &Path,
    options: &Options,
) -> CliResult<String> {
    let mut loader = FileLoader::new(dir, options.extension.as_str());
    let output = compile_with(&options.generator(), source, &mut loader, unit_name)?;
    info!(
        unit = unit_name,
        target = %options.target,
        bytes = output.len(),
        "generated"
    );
    Ok(output)
}

/// Compile the template file at `path`
pub fn compile_file(path: &Path, options: &Options) -> CliResult<String> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let unit = unit_name(path, &options.extension);
    compile_source(&source, &unit, &partial_dir(Some(path)), options)
}

/// Run the command with settings from the usual places
pub fn run(args: Args) -> CliResult<()> {
    let loader = ConfigLoader::new().with_explicit_path(args.config.clone());
    run_with(args, &loader)
}

/// Run the command with settings from `loader`
pub fn run_with(args: Args, loader: &ConfigLoader) -> CliResult<()> {
    let settings = loader.load()?;
    if args.show_config {
        let mut effective = settings;
        if let Some(lang) = args.lang {
            effective.lang = Some(Target::from(lang).as_str().to_string());
        }
        if let Some(package) = &args.go_package {
            effective.go_package = package.clone();
        }
        if let Some(runtime) = &args.go_runtime {
            effective.go_runtime = runtime.clone();
        }
        let rendered = effective.to_toml()?;
        return write_output(args.output.as_deref(), &rendered);
    }

    let options = Options::resolve(&args, settings)?;
    debug!(?options, "resolved options");

    let output = match args.template.as_deref() {
        Some(path) => compile_file(path, &options)?,
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(CliError::Stdin)?;
            compile_source(&source, STDIN_UNIT, &partial_dir(None), &options)?
        }
    };
    write_output(args.output.as_deref(), &output)
}

fn write_output(path: Option<&Path>, contents: &str) -> CliResult<()> {
    match path {
        Some(path) => fs::write(path, contents).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| CliError::Write {
                    path: PathBuf::from("-"),
                    source,
                })
        }
    }
}

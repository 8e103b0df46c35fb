//! Layered settings for the `stachegen` command
//!
//! Sources, lowest precedence first: built-in defaults, the user config file
//! (`<config dir>/stachegen/config.toml`), `stachegen.toml` in the working
//! directory or the file named by `--config`, then `STACHEGEN_*` environment
//! variables. Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stachegen_core::DEFAULT_RUNTIME_IMPORT;

use crate::error::CliResult;

/// Name of the per-project settings file
pub const PROJECT_CONFIG_FILE: &str = "stachegen.toml";

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "STACHEGEN";

/// Effective settings after all file and environment layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target language, `go` or `js`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Package clause for generated Go files
    pub go_package: String,
    /// Import path of the Go runtime support package
    pub go_runtime: String,
    /// File extension of templates and partials, without the dot
    pub extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lang: None,
            go_package: "main".to_string(),
            go_runtime: DEFAULT_RUNTIME_IMPORT.to_string(),
            extension: "mustache".to_string(),
        }
    }
}

impl Settings {
    /// Render the settings as TOML, in the format the loader reads back
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Builds [`Settings`] from files and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_path: Option<PathBuf>,
    project_path: PathBuf,
    explicit_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader for the current working directory and the user's config dir
    pub fn new() -> Self {
        Self {
            user_path: Self::default_user_path(),
            project_path: PathBuf::from(PROJECT_CONFIG_FILE),
            explicit_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Loader that only looks for `stachegen.toml` in `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            user_path: None,
            project_path: dir.as_ref().join(PROJECT_CONFIG_FILE),
            explicit_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read `path` instead of the project file; it must exist
    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn default_user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stachegen").join("config.toml"))
    }

    /// Merge every layer into [`Settings`]
    pub fn load(&self) -> CliResult<Settings> {
        let mut builder = Config::builder();
        if let Some(path) = &self.user_path {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        builder = match &self.explicit_path {
            Some(path) => builder.add_source(File::from(path.clone()).required(true)),
            None => builder.add_source(File::from(self.project_path.clone()).required(false)),
        };
        builder = builder.add_source(Environment::with_prefix(&self.env_prefix));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // A prefix nothing in the test environment sets.
    fn loader(dir: &Path) -> ConfigLoader {
        ConfigLoader::in_dir(dir).with_env_prefix("STACHEGEN_UNIT_TEST")
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = loader(dir.path()).load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.go_package, "main");
        assert_eq!(settings.extension, "mustache");
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "lang = \"go\"\ngo_package = \"views\"\n",
        )
        .unwrap();

        let settings = loader(dir.path()).load().unwrap();
        assert_eq!(settings.lang.as_deref(), Some("go"));
        assert_eq!(settings.go_package, "views");
        assert_eq!(settings.go_runtime, DEFAULT_RUNTIME_IMPORT);
    }

    #[test]
    fn test_explicit_path_replaces_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "lang = \"go\"\n").unwrap();
        let other = dir.path().join("other.toml");
        fs::write(&other, "lang = \"js\"\nextension = \"hbs\"\n").unwrap();

        let settings = loader(dir.path())
            .with_explicit_path(Some(other))
            .load()
            .unwrap();
        assert_eq!(settings.lang.as_deref(), Some("js"));
        assert_eq!(settings.extension, "hbs");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = loader(dir.path())
            .with_explicit_path(Some(dir.path().join("nope.toml")))
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            lang: Some("js".to_string()),
            ..Settings::default()
        };
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), settings.to_toml().unwrap()).unwrap();
        assert_eq!(loader(dir.path()).load().unwrap(), settings);
    }
}

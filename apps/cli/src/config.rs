//! CLI configuration
//!
//! Layered, lowest precedence first:
//! 1. built-in defaults
//! 2. `atrium.toml` in the working directory, or the file given with `--config`
//! 3. `ATRIUM__*` environment variables (`__` separates nesting levels,
//!    e.g. `ATRIUM__COMPILER__BASE_URI`), after loading `.env`

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use atrium_search::CompilerConfig;

const DEFAULT_CONFIG_FILE: &str = "atrium.toml";
const ENV_PREFIX: &str = "ATRIUM";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the atrium crates when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// `daily`, `hourly`, `minutely` or `never`.
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "atrium".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    /// Load the layered configuration. An explicit `path` must exist; the
    /// default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = ::config::Config::builder()
            .add_source(
                ::config::Config::try_from(&Config::default())
                    .context("Failed to build default configuration")?,
            )
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            anyhow::bail!(
                "logging.file_rotation must be daily, hourly, minutely or never, got '{}'",
                self.logging.file_rotation
            );
        }
        if self.logging.file_enabled && self.logging.file_directory.trim().is_empty() {
            anyhow::bail!("logging.file_directory must be set when file logging is enabled");
        }
        self.compiler.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("atrium-cli-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[logging]\nlevel = \"debug\"\n\n[compiler]\nbase_uri = \"http://repo.test\"\n\n[compiler.file_types]\nraw = [\"cr2\"]"
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
        assert_eq!(config.compiler.base_uri, "http://repo.test");
        assert_eq!(config.compiler.no_license, "no_license");
        assert_eq!(
            config.compiler.extensions_for("raw"),
            Some(&["cr2".to_string()][..])
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/atrium.toml"))).is_err());
    }

    #[test]
    fn unknown_rotation_is_rejected() {
        let mut config = Config::default();
        config.logging.file_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ParserError;

/// Environment variable that overrides the configured parser identifier.
pub const PARSER_ENV: &str = "PARSEHOST_PARSER";

/// Options for one parser. Which fields matter depends on the parser.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Registered parser identifier (`swift`, `compose`, ...).
    pub parser: String,
    /// Directory holding the gradle wrapper, relative to the working directory.
    #[serde(alias = "gradleWrapperPath")]
    pub gradle_wrapper_path: Option<PathBuf>,
    /// Xcode project whose directory holds the swift parser package.
    #[serde(alias = "xcodeprojPath")]
    pub xcodeproj_path: Option<PathBuf>,
    /// Prebuilt swift parser binary, relative to the working directory.
    #[serde(alias = "customSwiftCLIPath")]
    pub custom_swift_cli_path: Option<PathBuf>,
}

impl ParserConfig {
    pub fn new(parser: impl Into<String>) -> Self {
        Self {
            parser: parser.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ParserError> {
        toml::from_str(s).map_err(|e| ParserError::Config(e.to_string()))
    }

    /// Load from a TOML file. A missing file yields the default config;
    /// a present but invalid one is an error.
    pub fn load(path: &Path) -> Result<Self, ParserError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(ParserError::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(parser) = env::var(PARSER_ENV)
            && !parser.trim().is_empty()
        {
            self.parser.parser = parser.trim().to_string();
        }
    }
}

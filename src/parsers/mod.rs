pub mod compose;
pub mod swift;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::payload::Mode;
use crate::toolchain::Toolchain;

/// A registered parser executable. Adding a parser means adding a variant
/// here and a module beside this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Swift,
    Compose,
    /// Fixture parser used by the tool's own test suite.
    UnitTest,
}

impl ParserKind {
    pub const ALL: [ParserKind; 3] = [Self::Swift, Self::Compose, Self::UnitTest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::Compose => "compose",
            Self::UnitTest => "__unit_test__",
        }
    }

    /// Build the command line for this parser. The result is split on
    /// whitespace, so paths containing spaces are not supported.
    pub async fn resolve_command<T: Toolchain>(
        &self,
        cwd: &Path,
        config: &ParserConfig,
        mode: Mode,
        toolchain: &T,
    ) -> Result<String, ParserError> {
        match self {
            Self::Swift => swift::command(cwd, config, toolchain).await,
            Self::Compose => compose::command(cwd, config, mode, toolchain).await,
            Self::UnitTest => Ok(unit_test::command()),
        }
    }

    /// Remediation hint for a failed run, from its unstructured stderr.
    /// Only parsers whose exit codes are ambiguous register a classifier.
    pub fn error_suggestion(&self, diagnostics: &str) -> Option<&'static str> {
        match self {
            Self::Compose => compose::error_suggestion(diagnostics),
            Self::Swift | Self::UnitTest => None,
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserKind {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParserError::UnknownParser {
                name: s.to_string(),
                valid: Self::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

use std::path::{Path, PathBuf};

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::parsers::{ParserKind, compose};
use crate::payload::Mode;
use crate::toolchain::Toolchain;

/// How to run one registered parser.
#[derive(Debug)]
pub struct InvocationDescriptor {
    kind: ParserKind,
    /// When set, the request is written to this file (relative to the run's
    /// working directory) instead of the child's stdin.
    temporary_input_file: Option<&'static str>,
}

impl InvocationDescriptor {
    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn temporary_input_file(&self) -> Option<&'static str> {
        self.temporary_input_file
    }

    /// Where the request file lives for a run in `cwd`, if this parser uses one.
    pub fn temporary_input_path(&self, cwd: &Path) -> Option<PathBuf> {
        self.temporary_input_file.map(|rel| cwd.join(rel))
    }

    pub async fn resolve_command<T: Toolchain>(
        &self,
        cwd: &Path,
        config: &ParserConfig,
        mode: Mode,
        toolchain: &T,
    ) -> Result<String, ParserError> {
        self.kind.resolve_command(cwd, config, mode, toolchain).await
    }
}

static BUILTIN: [InvocationDescriptor; 3] = [
    InvocationDescriptor {
        kind: ParserKind::Swift,
        temporary_input_file: None,
    },
    InvocationDescriptor {
        kind: ParserKind::Compose,
        temporary_input_file: Some(compose::TEMPORARY_INPUT_FILE),
    },
    InvocationDescriptor {
        kind: ParserKind::UnitTest,
        temporary_input_file: None,
    },
];

/// Read-only table of the parsers this tool knows how to run.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    parsers: &'static [InvocationDescriptor],
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self { parsers: &BUILTIN }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(InvocationDescriptor::name).collect()
    }

    pub fn get(&self, kind: ParserKind) -> Option<&'static InvocationDescriptor> {
        self.parsers.iter().find(|d| d.kind == kind)
    }

    pub fn lookup(&self, name: &str) -> Result<&'static InvocationDescriptor, ParserError> {
        self.parsers
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| ParserError::UnknownParser {
                name: name.to_string(),
                valid: self.names().into_iter().map(String::from).collect(),
            })
    }
}

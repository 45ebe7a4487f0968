pub mod process;
pub mod registry;

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::message::{LogSink, Message, TracingSink, messages_in_result};
use crate::payload::RequestPayload;
use crate::toolchain::{FsToolchain, Toolchain};

use self::process::{InvokeOptions, ProcessInvoker};
use self::registry::Registry;

/// Successful parser run.
#[derive(Debug, Clone)]
pub struct ParserResponse {
    /// The JSON object the parser wrote to stdout, unmodified.
    pub result: Map<String, Value>,
    /// Structured messages received on stderr, in arrival order.
    pub messages: Vec<Message>,
    /// True if any stderr message was at ERROR level.
    pub has_errors: bool,
}

impl ParserResponse {
    /// Messages the parser returned inside its result object.
    pub fn result_messages(&self) -> Vec<Message> {
        messages_in_result(&self.result)
    }
}

/// Runs registered parsers: lookup, command resolution, one child process,
/// failure classification.
///
/// Runs of the same temp-file parser in the same working directory share an
/// input file and must not overlap.
pub struct ParserDispatch<T = FsToolchain> {
    registry: Registry,
    toolchain: T,
    invoker: ProcessInvoker,
}

impl Default for ParserDispatch<FsToolchain> {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserDispatch<FsToolchain> {
    pub fn new() -> Self {
        Self::with_toolchain(FsToolchain)
    }
}

impl<T: Toolchain> ParserDispatch<T> {
    pub fn with_toolchain(toolchain: T) -> Self {
        Self {
            registry: Registry::builtin(),
            toolchain,
            invoker: ProcessInvoker::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn call(
        &self,
        config: &ParserConfig,
        payload: &RequestPayload,
        cwd: &Path,
        sink: &dyn LogSink,
    ) -> Result<ParserResponse, ParserError> {
        self.call_with(config, payload, cwd, sink, &InvokeOptions::default())
            .await
    }

    pub async fn call_with(
        &self,
        config: &ParserConfig,
        payload: &RequestPayload,
        cwd: &Path,
        sink: &dyn LogSink,
        options: &InvokeOptions,
    ) -> Result<ParserResponse, ParserError> {
        let descriptor = self.registry.lookup(&config.parser)?;
        let command = descriptor
            .resolve_command(cwd, config, payload.mode(), &self.toolchain)
            .await?;
        let input_file = descriptor.temporary_input_path(cwd);

        let outcome = self
            .invoker
            .run(&command, cwd, payload, input_file.as_deref(), sink, options)
            .await?;

        if !outcome.success() {
            let suggestion = descriptor.kind().error_suggestion(&outcome.diagnostics);
            tracing::warn!(
                parser = descriptor.name(),
                code = outcome.exit_code,
                suggestion = suggestion.is_some(),
                "parser failed"
            );
            return Err(ParserError::ExecutionFailed {
                code: outcome.exit_code,
                suggestion: suggestion.map(String::from),
            });
        }

        let result: Map<String, Value> =
            serde_json::from_str(&outcome.stdout).map_err(ParserError::MalformedResult)?;

        Ok(ParserResponse {
            result,
            messages: outcome.messages,
            has_errors: outcome.has_errors,
        })
    }
}

/// Run the configured parser with filesystem toolchain lookups, logging its
/// messages through `tracing`.
pub async fn call_parser(
    config: &ParserConfig,
    payload: &RequestPayload,
    cwd: &Path,
) -> Result<ParserResponse, ParserError> {
    ParserDispatch::new()
        .call(config, payload, cwd, &TracingSink)
        .await
}

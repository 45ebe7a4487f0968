use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Invalid parser specified: \"{name}\". Valid parsers are: {}.", .valid.join(", "))]
    UnknownParser { name: String, valid: Vec<String> },

    /// The executable could not be started. The OS error is passed through as-is.
    #[error(transparent)]
    Spawn(std::io::Error),

    #[error("Parser exited with code {code}{}", .suggestion.as_deref().map(|s| format!(": {s}")).unwrap_or_default())]
    ExecutionFailed {
        code: i32,
        suggestion: Option<String>,
    },

    #[error("parser returned malformed result: {0}")]
    MalformedResult(#[source] serde_json::Error),

    #[error("toolchain lookup failed: {0}")]
    Toolchain(String),

    #[error("parser output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("parser run was cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to serialize parser request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("parser I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// Exit code of the parser process, for failures that got that far.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExecutionFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message shown to the person running the tool.
    pub fn user_message(&self) -> String {
        match self {
            // Already names the bad value and the alternatives.
            Self::UnknownParser { .. } | Self::Config(_) => self.to_string(),
            _ => format!(
                "Error calling parser: {self}. Try re-running the command with --verbose for more information."
            ),
        }
    }
}

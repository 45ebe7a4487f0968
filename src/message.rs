use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a parser message.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// A structured log entry emitted by a parser, either on stderr while it runs
/// or in the `messages` array of its result.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub message: String,
}

impl Message {
    /// Parse one line of diagnostic output. Anything other than a JSON object
    /// with a known `level` and a string `message` yields `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(line.trim()).ok()?;
        Self::from_value(&value)
    }

    /// Only JSON objects count; serde would otherwise accept `["INFO", "x"]`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

/// Where parser messages end up. One method per severity.
pub trait LogSink: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Debug => self.debug(message),
            Level::Info => self.info(message),
            Level::Warn => self.warn(message),
            Level::Error => self.error(message),
        }
    }
}

/// Forwards parser messages to `tracing` under the `parser` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "parser", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "parser", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "parser", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "parser", "{message}");
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MessageSummary {
    pub has_errors: bool,
}

/// Route a batch of messages to the sink. Any ERROR marks the batch.
pub fn handle_messages(messages: &[Message], sink: &dyn LogSink) -> MessageSummary {
    let mut summary = MessageSummary::default();
    for msg in messages {
        sink.log(msg.level, &msg.message);
        if msg.level == Level::Error {
            summary.has_errors = true;
        }
    }
    summary
}

/// The optional `messages` array of a parser result. Entries that don't have
/// the message shape are skipped.
pub fn messages_in_result(result: &Map<String, Value>) -> Vec<Message> {
    let Some(Value::Array(items)) = result.get("messages") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Message::from_value)
        .collect()
}

/// Incremental interpreter for a parser's stderr.
///
/// Each line is either a structured [`Message`], routed straight to the sink,
/// or free-form tool chatter, which is kept for error-suggestion lookup and
/// logged at debug level.
pub struct MessageStream<'a> {
    sink: &'a dyn LogSink,
    messages: Vec<Message>,
    diagnostics: String,
    has_errors: bool,
}

impl<'a> MessageStream<'a> {
    pub fn new(sink: &'a dyn LogSink) -> Self {
        Self {
            sink,
            messages: Vec::new(),
            diagnostics: String::new(),
            has_errors: false,
        }
    }

    /// Interpret one chunk of stderr (normally one line, newline included).
    pub fn accept(&mut self, chunk: &str) {
        match Message::from_line(chunk) {
            Some(msg) => {
                self.sink.log(msg.level, &msg.message);
                if msg.level == Level::Error {
                    self.has_errors = true;
                }
                self.messages.push(msg);
            }
            None => {
                self.diagnostics.push_str(chunk);
                self.sink.debug(chunk.trim());
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Unstructured stderr text seen so far.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    pub fn finish(self) -> (Vec<Message>, String, bool) {
        (self.messages, self.diagnostics, self.has_errors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Level, String)>>);

    impl LogSink for Recorder {
        fn debug(&self, message: &str) {
            self.0.lock().unwrap().push((Level::Debug, message.to_string()));
        }
        fn info(&self, message: &str) {
            self.0.lock().unwrap().push((Level::Info, message.to_string()));
        }
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push((Level::Warn, message.to_string()));
        }
        fn error(&self, message: &str) {
            self.0.lock().unwrap().push((Level::Error, message.to_string()));
        }
    }

    #[test]
    fn structured_line_is_routed_by_level() {
        let sink = Recorder::default();
        let mut stream = MessageStream::new(&sink);
        stream.accept("{\"level\":\"WARN\",\"message\":\"slow build\"}\n");

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![(Level::Warn, "slow build".to_string())]
        );
        assert!(stream.diagnostics().is_empty());
        assert!(!stream.has_errors());
        assert_eq!(stream.messages().len(), 1);
    }

    #[test]
    fn plain_text_goes_to_debug_and_accumulates() {
        let sink = Recorder::default();
        let mut stream = MessageStream::new(&sink);
        stream.accept("Compiling figma-swift v0.1.0\n");

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![(Level::Debug, "Compiling figma-swift v0.1.0".to_string())]
        );
        assert_eq!(stream.diagnostics(), "Compiling figma-swift v0.1.0\n");
        assert!(stream.messages().is_empty());
    }

    #[test]
    fn json_without_message_shape_is_unstructured() {
        let sink = Recorder::default();
        let mut stream = MessageStream::new(&sink);
        stream.accept(r#"{"level":"TRACE","message":"x"}"#);
        stream.accept(r#"{"progress":0.5}"#);
        stream.accept(r#"["ERROR","tuple form"]"#);

        let calls = sink.0.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(level, _)| *level == Level::Debug));
        assert!(stream.messages().is_empty());
        assert!(!stream.has_errors());
    }

    #[test]
    fn error_message_sets_flag() {
        let sink = Recorder::default();
        let mut stream = MessageStream::new(&sink);
        stream.accept(r#"{"level":"INFO","message":"a"}"#);
        assert!(!stream.has_errors());
        stream.accept(r#"{"level":"ERROR","message":"b"}"#);
        stream.accept(r#"{"level":"INFO","message":"c"}"#);
        assert!(stream.has_errors());

        let (messages, diagnostics, has_errors) = stream.finish();
        let texts: Vec<_> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(diagnostics.is_empty());
        assert!(has_errors);
    }

    #[test]
    fn batch_summary_reports_errors() {
        let sink = Recorder::default();
        let batch = vec![
            Message {
                level: Level::Debug,
                message: "d".into(),
            },
            Message {
                level: Level::Error,
                message: "e".into(),
            },
        ];
        assert!(handle_messages(&batch, &sink).has_errors);
        assert!(!handle_messages(&batch[..1], &sink).has_errors);
        assert_eq!(sink.0.lock().unwrap().len(), 3);
    }

    #[test]
    fn result_messages_skip_malformed_entries() {
        let result: Map<String, Value> = serde_json::from_str(
            r#"{"docs":[],"messages":[{"level":"INFO","message":"ok"},{"level":"LOUD"},"text"]}"#,
        )
        .unwrap();
        let messages = messages_in_result(&result);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "ok");

        assert!(messages_in_result(&Map::new()).is_empty());
    }
}

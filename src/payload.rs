use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the parser is being asked to do.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Generate new Code Connect files from component definitions.
    Create,
    /// Parse existing Code Connect files.
    Parse,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Parse => "PARSE",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "PARSE" => Ok(Self::Parse),
            other => Err(format!("unknown mode: {other} (expected CREATE or PARSE)")),
        }
    }
}

/// Request handed to a parser executable as a single JSON object.
///
/// `mode` is always present; everything else is parser-specific and passed
/// through untouched.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RequestPayload {
    mode: Mode,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl RequestPayload {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            fields: Map::new(),
        }
    }

    /// Build a payload from parser-specific fields. A `mode` key in `fields`
    /// is dropped in favour of `mode`.
    pub fn with_fields(mode: Mode, mut fields: Map<String, Value>) -> Self {
        fields.remove("mode");
        Self { mode, fields }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_payload_serializes_to_mode_only() {
        let payload = RequestPayload::new(Mode::Parse);
        assert_eq!(payload.to_json().unwrap(), r#"{"mode":"PARSE"}"#);
    }

    #[test]
    fn extra_fields_are_flattened() {
        let mut fields = Map::new();
        fields.insert("mode".into(), Value::from("CREATE"));
        fields.insert("paths".into(), serde_json::json!(["a.swift"]));
        let payload = RequestPayload::with_fields(Mode::Parse, fields);

        let value: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["mode"], "PARSE");
        assert_eq!(value["paths"][0], "a.swift");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("create".parse::<Mode>().unwrap(), Mode::Create);
        assert_eq!(" PARSE ".parse::<Mode>().unwrap(), Mode::Parse);
        assert!("DELETE".parse::<Mode>().is_err());
    }
}

//! Guided decoding directives.
//!
//! A caller can smuggle a guided-decoding request into a chat by sending an
//! assistant message at index 1 whose text is a small JSON object:
//!
//! ```json
//! {"param_type": "guided_json", "param": {"type": "object"}}
//! ```
//!
//! [`GuidedDirective::parse`] turns that text into a typed directive, and
//! [`GuidedParameterExtractor`] folds it into [`crate::ModelParameters`]
//! before the request reaches the backend.
//!
//! ```
//! use vllm_compat::guided::{GuidedDirective, GuidedType};
//!
//! let d = GuidedDirective::parse(r#"{"param_type":"guided_regex","param":"[0-9]+"}"#).unwrap();
//! assert_eq!(d.param_type, GuidedType::Regex);
//! assert_eq!(d.to_param_value().unwrap(), r#""[0-9]+""#);
//! ```

pub mod extractor;

pub use extractor::{DirectiveExtraction, GuidedParameterExtractor, NormalizeOutcome};

use serde::{de, Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Backend constrained-decoding mode selected by a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidedType {
    #[serde(rename = "guided_json")]
    Json,
    #[serde(rename = "guided_regex")]
    Regex,
    #[serde(rename = "guided_choice")]
    Choice,
    #[serde(rename = "guided_grammar")]
    Grammar,
}

impl GuidedType {
    pub const ALL: [GuidedType; 4] = [
        GuidedType::Json,
        GuidedType::Regex,
        GuidedType::Choice,
        GuidedType::Grammar,
    ];

    /// The request parameter name the backend expects for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidedType::Json => "guided_json",
            GuidedType::Regex => "guided_regex",
            GuidedType::Choice => "guided_choice",
            GuidedType::Grammar => "guided_grammar",
        }
    }
}

impl fmt::Display for GuidedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GuidedType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown guided type: {}", s))
    }
}

/// Directive payload: a mapping (schema-like) or a plain string (pattern-like).
///
/// The payload shape is not checked against [`GuidedType`]; a regex
/// directive carrying a mapping is accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuidedPayload {
    Object(serde_json::Map<String, serde_json::Value>),
    Text(String),
}

/// A guided-decoding directive parsed from a prompt message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidedDirective {
    pub param_type: GuidedType,
    pub param: GuidedPayload,
}

/// Why a message could not be read as a directive.
///
/// None of these reach the caller of an invoke; the extractor logs and
/// ignores them.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("directive is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("directive does not match the expected shape: {0}")]
    InvalidShape(#[source] serde_json::Error),

    #[error("unexpected failure while reading directive: {0}")]
    Unexpected(String),
}

impl ExtractionError {
    /// Malformed input is the common case (most assistant messages are not
    /// directives) and is not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ExtractionError::MalformedJson(_) | ExtractionError::InvalidShape(_)
        )
    }

    fn from_json(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Syntax | Category::Eof => ExtractionError::MalformedJson(err),
            Category::Data => ExtractionError::InvalidShape(err),
            Category::Io => ExtractionError::Unexpected(err.to_string()),
        }
    }
}

impl GuidedDirective {
    /// Parse and validate a directive from message text.
    ///
    /// Only a top-level JSON object is a directive. Arrays, strings, numbers
    /// and `null` are valid JSON but the wrong shape.
    pub fn parse(text: &str) -> Result<Self, ExtractionError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(ExtractionError::from_json)?;
        if !value.is_object() {
            return Err(ExtractionError::InvalidShape(de::Error::invalid_type(
                unexpected(&value),
                &"a directive object",
            )));
        }
        GuidedDirective::deserialize(value).map_err(ExtractionError::from_json)
    }

    /// Serialize the payload into the outgoing parameter value.
    ///
    /// String payloads are serialized too (they come out quoted). Non-ASCII
    /// text stays literal UTF-8.
    pub fn to_param_value(&self) -> Result<String, ExtractionError> {
        to_spaced_json(&self.param)
    }
}

fn unexpected(value: &serde_json::Value) -> de::Unexpected<'_> {
    use serde_json::Value;
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

/// Serialize with `", "` / `": "` separators and literal UTF-8, matching the
/// backend's reference client output (`{"type": "object"}`).
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExtractionError> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ExtractionError::Unexpected(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ExtractionError::Unexpected(e.to_string()))
}

struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

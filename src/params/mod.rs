//! Typed model parameters with a passthrough bag.
//!
//! The host hands over parameters as an untyped JSON object. Options the
//! adapter rewrites get named fields and are type-checked at the boundary;
//! everything else (temperature, top_k, ...) rides along in
//! [`ModelParameters::extra`] and is forwarded verbatim.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::guided::GuidedType;
use crate::{Error, ErrorContext, Result};

pub const GUIDED_JSON: &str = "guided_json";
pub const GUIDED_REGEX: &str = "guided_regex";
pub const GUIDED_CHOICE: &str = "guided_choice";
pub const GUIDED_GRAMMAR: &str = "guided_grammar";
pub const JSON_SCHEMA: &str = "json_schema";
pub const ENABLE_THINKING: &str = "enable_thinking";
pub const DYNAMIC_REQUEST_GUIDED: &str = "dynamic_request_guided";
pub const CHAT_TEMPLATE_KWARGS: &str = "chat_template_kwargs";

/// A JSON schema given either as serialized text or as an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaValue {
    Text(String),
    Object(Map<String, Value>),
}

/// Choice constraint: a list of options, or serialized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Text(String),
    List(Vec<String>),
}

/// Request parameters in the vLLM dialect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelParameters {
    pub guided_json: Option<SchemaValue>,
    pub guided_regex: Option<String>,
    pub guided_choice: Option<ChoiceValue>,
    pub guided_grammar: Option<String>,
    /// Alternate spelling of `guided_json` used by some callers.
    pub json_schema: Option<SchemaValue>,
    pub enable_thinking: Option<bool>,
    /// Per-request switch for directive extraction; never forwarded.
    pub dynamic_request_guided: Option<bool>,
    pub chat_template_kwargs: Option<Map<String, Value>>,
    /// Unrecognized options, forwarded verbatim.
    pub extra: Map<String, Value>,
}

impl ModelParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an untyped parameter object, validating recognized keys.
    ///
    /// `null` values for recognized keys are treated as absent.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        Ok(Self {
            guided_json: take_field(&mut map, GUIDED_JSON)?,
            guided_regex: take_field(&mut map, GUIDED_REGEX)?,
            guided_choice: take_field(&mut map, GUIDED_CHOICE)?,
            guided_grammar: take_field(&mut map, GUIDED_GRAMMAR)?,
            json_schema: take_field(&mut map, JSON_SCHEMA)?,
            enable_thinking: take_field(&mut map, ENABLE_THINKING)?,
            dynamic_request_guided: take_field(&mut map, DYNAMIC_REQUEST_GUIDED)?,
            chat_template_kwargs: take_field(&mut map, CHAT_TEMPLATE_KWARGS)?,
            extra: map,
        })
    }

    /// The outgoing parameter object. Absent fields are omitted; recognized
    /// fields win over same-named keys in `extra`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        put(&mut map, GUIDED_JSON, &self.guided_json);
        put(&mut map, GUIDED_REGEX, &self.guided_regex);
        put(&mut map, GUIDED_CHOICE, &self.guided_choice);
        put(&mut map, GUIDED_GRAMMAR, &self.guided_grammar);
        put(&mut map, JSON_SCHEMA, &self.json_schema);
        put(&mut map, ENABLE_THINKING, &self.enable_thinking);
        put(&mut map, DYNAMIC_REQUEST_GUIDED, &self.dynamic_request_guided);
        put(&mut map, CHAT_TEMPLATE_KWARGS, &self.chat_template_kwargs);
        map
    }

    /// Current value of a guided-decoding option, as it would be sent.
    pub fn guided(&self, kind: GuidedType) -> Option<Value> {
        let v = match kind {
            GuidedType::Json => self.guided_json.as_ref().map(serde_json::to_value),
            GuidedType::Regex => self.guided_regex.as_ref().map(serde_json::to_value),
            GuidedType::Choice => self.guided_choice.as_ref().map(serde_json::to_value),
            GuidedType::Grammar => self.guided_grammar.as_ref().map(serde_json::to_value),
        };
        v.and_then(|r| r.ok())
    }

    /// Set a guided-decoding option to an already serialized value.
    pub fn set_guided(&mut self, kind: GuidedType, value: String) {
        match kind {
            GuidedType::Json => self.guided_json = Some(SchemaValue::Text(value)),
            GuidedType::Regex => self.guided_regex = Some(value),
            GuidedType::Choice => self.guided_choice = Some(ChoiceValue::Text(value)),
            GuidedType::Grammar => self.guided_grammar = Some(value),
        }
    }

    /// Remove and return the extraction switch.
    pub fn take_dynamic_request_guided(&mut self) -> Option<bool> {
        self.dynamic_request_guided.take()
    }

    /// Remove `enable_thinking`; when it was `true`, carry it in
    /// `chat_template_kwargs` where the chat template reads it.
    pub fn fold_enable_thinking(&mut self) -> Option<bool> {
        let enabled = self.enable_thinking.take()?;
        if enabled {
            self.chat_template_kwargs
                .get_or_insert_with(Map::new)
                .insert(ENABLE_THINKING.to_string(), Value::Bool(true));
        }
        Some(enabled)
    }

    /// Rename `json_schema` to `guided_json`, replacing any existing value.
    pub fn apply_json_schema_alias(&mut self) -> bool {
        match self.json_schema.take() {
            Some(schema) => {
                self.guided_json = Some(schema);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TryFrom<Value> for ModelParameters {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Self::default()),
            other => Err(Error::validation(
                "model parameters must be a JSON object",
                ErrorContext::at("model_parameters")
                    .with_details(format!("got {}", json_kind(&other)))
                    .with_source("model_parameters"),
            )),
        }
    }
}

impl Serialize for ModelParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModelParameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(map).map_err(D::Error::custom)
    }
}

fn take_field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Result<Option<T>> {
    match map.shift_remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let kind = json_kind(&v);
            serde_json::from_value(v).map(Some).map_err(|e| {
                Error::validation(
                    format!("invalid value for `{}`", key),
                    ErrorContext::at(format!("model_parameters.{}", key))
                        .with_details(format!("got {}: {}", kind, e))
                        .with_source("model_parameters"),
                )
            })
        }
    }
}

fn put<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(v) = value {
        if let Ok(v) = serde_json::to_value(v) {
            map.insert(key.to_string(), v);
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

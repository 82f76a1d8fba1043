//! Model schema augmentation.
//!
//! The host describes each customizable model with a list of parameter
//! rules that drive its settings UI. The vLLM adapter exposes a few extra
//! knobs on top of whatever the inner client declares.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{
    DYNAMIC_REQUEST_GUIDED, ENABLE_THINKING, GUIDED_GRAMMAR, GUIDED_JSON, GUIDED_REGEX,
    JSON_SCHEMA,
};

/// Localized text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nObject {
    #[serde(rename = "en_US")]
    pub en_us: String,
    #[serde(rename = "zh_Hans", default, skip_serializing_if = "Option::is_none")]
    pub zh_hans: Option<String>,
}

impl I18nObject {
    pub fn en(text: impl Into<String>) -> Self {
        Self {
            en_us: text.into(),
            zh_hans: None,
        }
    }

    pub fn with_zh_hans(mut self, text: impl Into<String>) -> Self {
        self.zh_hans = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Float,
    Int,
    String,
    Boolean,
    Text,
}

/// One configurable request parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_template: Option<String>,
    pub label: I18nObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<I18nObject>,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParameterRule {
    pub fn new(name: impl Into<String>, param_type: ParameterType, label: I18nObject) -> Self {
        Self {
            name: name.into(),
            use_template: None,
            label,
            help: None,
            param_type,
            default: None,
            required: false,
            options: Vec::new(),
        }
    }

    pub fn with_help(mut self, help: I18nObject) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.use_template = Some(template.into());
        self
    }
}

/// Host-side description of a customizable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub model: String,
    pub label: I18nObject,
    #[serde(default = "default_model_type")]
    pub model_type: String,
    #[serde(default)]
    pub model_properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub parameter_rules: Vec<ParameterRule>,
}

fn default_model_type() -> String {
    "llm".to_string()
}

impl ModelSchema {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            label: I18nObject::en(model.clone()),
            model,
            model_type: default_model_type(),
            model_properties: serde_json::Map::new(),
            parameter_rules: Vec::new(),
        }
    }

    pub fn rule(&self, name: &str) -> Option<&ParameterRule> {
        self.parameter_rules.iter().find(|r| r.name == name)
    }
}

/// Parameter rules the adapter adds to every model.
pub fn vllm_parameter_rules() -> Vec<ParameterRule> {
    vec![
        ParameterRule::new(JSON_SCHEMA, ParameterType::String, I18nObject::en(JSON_SCHEMA))
            .with_template(JSON_SCHEMA),
        ParameterRule::new(
            ENABLE_THINKING,
            ParameterType::Boolean,
            I18nObject::en("Deep thinking").with_zh_hans("深度思考"),
        )
        .with_help(
            I18nObject::en(
                "Whether to enable deep thinking, applicable to various thinking mode models \
                 deployed on reasoning frameworks such as vLLM for example Qwen3 and deepseek-r1.",
            )
            .with_zh_hans("是否开启深度思考，适用于vLLM等推理框架部署的多种思考模式模型，例如Qwen3和deepseek-r1。"),
        )
        .with_default(Value::Bool(false)),
        ParameterRule::new(GUIDED_JSON, ParameterType::Text, I18nObject::en(GUIDED_JSON))
            .with_help(I18nObject::en(
                "guided_json in vllm, If specified, the output will follow the JSON schema.",
            )),
        ParameterRule::new(GUIDED_REGEX, ParameterType::Text, I18nObject::en(GUIDED_REGEX))
            .with_help(I18nObject::en(
                "If specified, the output will follow the regex pattern.",
            )),
        ParameterRule::new(
            GUIDED_GRAMMAR,
            ParameterType::Text,
            I18nObject::en(GUIDED_GRAMMAR),
        )
        .with_help(I18nObject::en(
            "If specified, the output will follow the context free grammar.",
        )),
        ParameterRule::new(
            DYNAMIC_REQUEST_GUIDED,
            ParameterType::Boolean,
            I18nObject::en("Dynamic Request Guided"),
        )
        .with_help(I18nObject::en(
            "If set to true, when the prompt has 2nd part and it's assistant, this provider \
             will use the assistant part as guided param.",
        ))
        .with_default(Value::Bool(false)),
    ]
}

/// Append the adapter's rules to `schema`, skipping names it already has.
pub fn augment_schema(schema: &mut ModelSchema) {
    for rule in vllm_parameter_rules() {
        if schema.rule(&rule.name).is_none() {
            schema.parameter_rules.push(rule);
        }
    }
}

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use super::{ExtractionError, GuidedDirective, GuidedType};
use crate::params::ModelParameters;
use crate::types::PromptMessage;
use crate::{Error, ErrorContext, Result};

/// Environment variable read by [`DirectiveExtraction::from_env`].
pub const DIRECTIVE_EXTRACTION_ENV: &str = "VLLM_COMPAT_DIRECTIVE_EXTRACTION";

/// Index of the message that may carry a directive.
const DIRECTIVE_INDEX: usize = 1;

/// Whether directive extraction runs when a request does not say.
///
/// A `dynamic_request_guided` flag in the request parameters always wins;
/// this only decides the case where the flag is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectiveExtraction {
    /// Extract unless the request sets `dynamic_request_guided: false`.
    Always,
    /// Extract only when the request sets `dynamic_request_guided: true`.
    #[default]
    OptIn,
}

impl DirectiveExtraction {
    /// Read the policy from `VLLM_COMPAT_DIRECTIVE_EXTRACTION`, falling back
    /// to the default when unset.
    pub fn from_env() -> Result<Self> {
        match env::var(DIRECTIVE_EXTRACTION_ENV) {
            Ok(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Self::default()),
        }
    }

    fn enabled(&self, flag: Option<bool>) -> bool {
        match (flag, self) {
            (Some(explicit), _) => explicit,
            (None, DirectiveExtraction::Always) => true,
            (None, DirectiveExtraction::OptIn) => false,
        }
    }
}

impl fmt::Display for DirectiveExtraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveExtraction::Always => f.write_str("always"),
            DirectiveExtraction::OptIn => f.write_str("opt-in"),
        }
    }
}

impl FromStr for DirectiveExtraction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "on" => Ok(DirectiveExtraction::Always),
            "opt-in" | "opt_in" | "optin" | "off" => Ok(DirectiveExtraction::OptIn),
            other => Err(Error::configuration(
                format!("unknown directive extraction policy: {}", other),
                ErrorContext::at(DIRECTIVE_EXTRACTION_ENV)
                    .with_details("expected one of: always, opt-in")
                    .with_source("directive_extraction"),
            )),
        }
    }
}

/// What [`GuidedParameterExtractor::normalize`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOutcome {
    /// Set when a directive message was consumed.
    pub directive: Option<GuidedType>,
    /// The `enable_thinking` value that was folded into `chat_template_kwargs`.
    pub thinking: Option<bool>,
    /// `json_schema` was renamed to `guided_json`.
    pub json_schema_aliased: bool,
}

impl NormalizeOutcome {
    pub fn is_noop(&self) -> bool {
        *self == NormalizeOutcome::default()
    }
}

/// Rewrites OpenAI-style request parameters into the vLLM dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidedParameterExtractor {
    policy: DirectiveExtraction,
}

impl GuidedParameterExtractor {
    pub fn new(policy: DirectiveExtraction) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DirectiveExtraction {
        self.policy
    }

    /// Apply every parameter rewrite for one call, in place.
    ///
    /// Order: drop the `dynamic_request_guided` flag, extract a directive if
    /// enabled, fold `enable_thinking`, rename `json_schema`. Never fails.
    pub fn normalize(
        &self,
        params: &mut ModelParameters,
        messages: &mut Vec<PromptMessage>,
    ) -> NormalizeOutcome {
        let flag = params.take_dynamic_request_guided();
        let directive = if self.policy.enabled(flag) {
            Self::extract(params, messages)
        } else {
            None
        };

        // vLLM leaves thinking on for reasoning models unless told otherwise,
        // so the toggle only travels when a caller set it.
        let thinking = params.fold_enable_thinking();
        let json_schema_aliased = params.apply_json_schema_alias();

        NormalizeOutcome {
            directive,
            thinking,
            json_schema_aliased,
        }
    }

    /// Fold a directive carried by `messages[1]` into `params` and drop that
    /// message. Returns the directive kind when one was consumed.
    ///
    /// Leaves both arguments untouched unless the whole extraction succeeds.
    pub fn extract(
        params: &mut ModelParameters,
        messages: &mut Vec<PromptMessage>,
    ) -> Option<GuidedType> {
        let text = directive_candidate(messages)?;

        match read_directive(text) {
            Ok((kind, value)) => {
                params.set_guided(kind, value);
                messages.remove(DIRECTIVE_INDEX);
                debug!("Extracted {} directive from prompt", kind);
                Some(kind)
            }
            Err(e) if e.is_expected() => {
                debug!("No directive in prompt, bypass: {}", e);
                None
            }
            Err(e) => {
                warn!("Error in extract param from prompt, bypass: {}", e);
                None
            }
        }
    }
}

/// Text of `messages[1]` when it could be a directive: an assistant message
/// with plain string content.
fn directive_candidate(messages: &[PromptMessage]) -> Option<&str> {
    let msg = messages.get(DIRECTIVE_INDEX)?;
    if !msg.is_assistant() {
        return None;
    }
    msg.text()
}

fn read_directive(text: &str) -> std::result::Result<(GuidedType, String), ExtractionError> {
    let directive = GuidedDirective::parse(text)?;
    let value = directive.to_param_value()?;
    Ok((directive.param_type, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentPart, MessageContent, PromptMessageRole};
    use serde_json::json;

    fn conversation(second: PromptMessage) -> Vec<PromptMessage> {
        vec![
            PromptMessage::system("You are terse."),
            second,
            PromptMessage::user("Give me the answer."),
        ]
    }

    fn params(v: serde_json::Value) -> ModelParameters {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_extract_json_directive() {
        let mut p = ModelParameters::default();
        let mut msgs = conversation(PromptMessage::assistant(
            r#"{"param_type":"guided_json","param":{"type":"object"}}"#,
        ));

        let kind = GuidedParameterExtractor::extract(&mut p, &mut msgs);

        assert_eq!(kind, Some(GuidedType::Json));
        assert_eq!(p.guided(GuidedType::Json), Some(json!(r#"{"type": "object"}"#)));
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1], PromptMessage::user("Give me the answer."));
    }

    #[test]
    fn test_extract_skips_short_sequences() {
        let mut p = ModelParameters::default();
        let mut msgs = vec![PromptMessage::assistant(
            r#"{"param_type":"guided_json","param":{}}"#,
        )];
        assert_eq!(GuidedParameterExtractor::extract(&mut p, &mut msgs), None);
        assert_eq!(msgs.len(), 1);
        assert_eq!(p, ModelParameters::default());
    }

    #[test]
    fn test_extract_skips_non_assistant() {
        let mut p = ModelParameters::default();
        let text = r#"{"param_type":"guided_regex","param":"a+"}"#;
        for second in [PromptMessage::user(text), PromptMessage::tool("call-1", text)] {
            let mut msgs = conversation(second);
            let before = msgs.clone();
            assert_eq!(GuidedParameterExtractor::extract(&mut p, &mut msgs), None);
            assert_eq!(msgs, before);
            assert_eq!(p, ModelParameters::default());
        }
    }

    #[test]
    fn test_extract_ignores_non_object_json() {
        for text in [
            r#"["guided_regex", "a+"]"#,
            r#"[{"param_type":"guided_json","param":{"type":"object"}}]"#,
            r#""guided_json""#,
            "3.14",
            "null",
        ] {
            let mut p = params(json!({"top_p": 0.5}));
            let mut msgs = conversation(PromptMessage::assistant(text));
            let before = (p.clone(), msgs.clone());
            assert_eq!(GuidedParameterExtractor::extract(&mut p, &mut msgs), None, "{text}");
            assert_eq!((p, msgs), before, "{text}");
        }
    }

    #[test]
    fn test_extract_skips_multipart_content() {
        let mut p = ModelParameters::default();
        let mut msgs = conversation(PromptMessage::with_content(
            PromptMessageRole::Assistant,
            MessageContent::Parts(vec![ContentPart::Text {
                text: r#"{"param_type":"guided_regex","param":"a+"}"#.into(),
            }]),
        ));
        assert_eq!(GuidedParameterExtractor::extract(&mut p, &mut msgs), None);
        assert_eq!(msgs.len(), 3);
    }

    #[test]
    fn test_extract_ignores_plain_assistant_text() {
        let mut p = params(json!({"temperature": 0.2}));
        let mut msgs = conversation(PromptMessage::assistant("not json"));
        let before = (p.clone(), msgs.clone());
        assert_eq!(GuidedParameterExtractor::extract(&mut p, &mut msgs), None);
        assert_eq!((p, msgs), before);
    }

    #[test]
    fn test_normalize_opt_in_requires_flag() {
        let ex = GuidedParameterExtractor::new(DirectiveExtraction::OptIn);
        let directive = r#"{"param_type":"guided_choice","param":"yes"}"#;

        let mut p = ModelParameters::default();
        let mut msgs = conversation(PromptMessage::assistant(directive));
        let out = ex.normalize(&mut p, &mut msgs);
        assert!(out.is_noop());
        assert_eq!(msgs.len(), 3);

        let mut p = params(json!({"dynamic_request_guided": true}));
        let mut msgs = conversation(PromptMessage::assistant(directive));
        let out = ex.normalize(&mut p, &mut msgs);
        assert_eq!(out.directive, Some(GuidedType::Choice));
        assert_eq!(p.dynamic_request_guided, None);
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn test_normalize_always_honours_explicit_false() {
        let ex = GuidedParameterExtractor::new(DirectiveExtraction::Always);
        let directive = r#"{"param_type":"guided_grammar","param":"root ::= \"a\""}"#;

        let mut p = params(json!({"dynamic_request_guided": false}));
        let mut msgs = conversation(PromptMessage::assistant(directive));
        let out = ex.normalize(&mut p, &mut msgs);
        assert_eq!(out.directive, None);
        assert_eq!(p.dynamic_request_guided, None);
        assert_eq!(msgs.len(), 3);

        let mut p = ModelParameters::default();
        let mut msgs = conversation(PromptMessage::assistant(directive));
        assert_eq!(
            ex.normalize(&mut p, &mut msgs).directive,
            Some(GuidedType::Grammar)
        );
        assert_eq!(
            p.guided(GuidedType::Grammar),
            Some(json!(r#""root ::= \"a\"""#))
        );
    }

    #[test]
    fn test_normalize_thinking_and_alias() {
        let ex = GuidedParameterExtractor::default();
        let mut p = params(json!({
            "enable_thinking": true,
            "json_schema": "{\"type\": \"array\"}"
        }));
        let mut msgs = vec![PromptMessage::user("hi")];
        let out = ex.normalize(&mut p, &mut msgs);

        assert_eq!(out.thinking, Some(true));
        assert!(out.json_schema_aliased);
        let map = p.to_map();
        assert!(!map.contains_key("enable_thinking"));
        assert!(!map.contains_key("json_schema"));
        assert_eq!(map["chat_template_kwargs"], json!({"enable_thinking": true}));
        assert_eq!(map["guided_json"], json!("{\"type\": \"array\"}"));
    }

    #[test]
    fn test_normalize_thinking_false_injects_nothing() {
        let ex = GuidedParameterExtractor::default();
        let mut p = params(json!({"enable_thinking": false}));
        let mut msgs = Vec::new();
        let out = ex.normalize(&mut p, &mut msgs);
        assert_eq!(out.thinking, Some(false));
        assert_eq!(p.to_map(), serde_json::Map::new());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let ex = GuidedParameterExtractor::new(DirectiveExtraction::Always);
        let mut p = params(json!({
            "enable_thinking": true,
            "json_schema": {"type": "object"},
            "top_k": 20
        }));
        let mut msgs = vec![PromptMessage::user("hi"), PromptMessage::user("again")];
        ex.normalize(&mut p, &mut msgs);

        let snapshot = (p.clone(), msgs.clone());
        let out = ex.normalize(&mut p, &mut msgs);
        assert!(out.is_noop());
        assert_eq!((p, msgs), snapshot);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "always".parse::<DirectiveExtraction>().unwrap(),
            DirectiveExtraction::Always
        );
        assert_eq!(
            " Opt_In ".parse::<DirectiveExtraction>().unwrap(),
            DirectiveExtraction::OptIn
        );
        let err = "sometimes".parse::<DirectiveExtraction>().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}

//! # vllm-compat
//!
//! Adapts an OpenAI-compatible chat completion client to the parameter
//! dialect of a vLLM inference server.
//!
//! ## Overview
//!
//! vLLM accepts a superset of the OpenAI request options: guided decoding
//! (`guided_json`, `guided_regex`, `guided_choice`, `guided_grammar`) and
//! chat template switches such as `chat_template_kwargs.enable_thinking`.
//! Hosts that only speak the OpenAI shape can still reach those options
//! through [`VllmClient`], which rewrites each request before delegating to
//! the wrapped client:
//!
//! - a guided-decoding directive sent as the assistant message at index 1
//!   is folded into the parameters and removed from the prompt
//! - `enable_thinking` moves into `chat_template_kwargs`
//! - `json_schema` is renamed to `guided_json`
//! - the `dynamic_request_guided` switch is consumed and never forwarded
//!
//! Directive extraction is best-effort: input that is not a directive is
//! left alone and never fails the call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vllm_compat::{
//!     CompletionClient, InvokeRequest, ModelParameters, PromptMessage, VllmClientBuilder,
//! };
//!
//! async fn run<C: CompletionClient>(inner: C) -> vllm_compat::Result<()> {
//!     let client = VllmClientBuilder::from_env()?.build(inner);
//!
//!     let params = ModelParameters::try_from(serde_json::json!({
//!         "dynamic_request_guided": true,
//!         "temperature": 0.2
//!     }))?;
//!     let request = InvokeRequest::new(
//!         "qwen3-8b",
//!         vec![
//!             PromptMessage::system("Extract the city."),
//!             PromptMessage::assistant(r#"{"param_type":"guided_choice","param":"Paris"}"#),
//!             PromptMessage::user("I live in Paris."),
//!         ],
//!     )
//!     .model_parameters(params)
//!     .stream(false);
//!
//!     let _result = client.invoke(request).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`guided`] | Directive parsing and the parameter extractor |
//! | [`params`] | Typed request parameters with a passthrough bag |
//! | [`client`] | Completion client trait and the wrapping client |
//! | [`schema`] | Parameter rules exposed to the host |
//! | [`types`] | Prompt messages, tools and completion results |
//! | [`logging`] | Tracing subscriber setup |

pub mod client;
pub mod guided;
pub mod logging;
pub mod params;
pub mod schema;
pub mod types;

pub use client::{CompletionClient, InvokeRequest, InvokeResponse, VllmClient, VllmClientBuilder};
pub use guided::{
    DirectiveExtraction, ExtractionError, GuidedDirective, GuidedParameterExtractor, GuidedType,
};
pub use params::ModelParameters;
pub use schema::ModelSchema;
pub use types::{
    Credentials, LlmResult, LlmResultChunk, PromptMessage, PromptMessageRole, PromptMessageTool,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

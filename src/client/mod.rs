//! Completion client seam and the vLLM-dialect wrapper.
//!
//! [`CompletionClient`] is the contract the host's OpenAI-compatible client
//! fulfils. [`VllmClient`] implements the same contract by composition: it
//! rewrites the request, then calls the inner client directly.

mod builder;
mod core;

pub use self::builder::VllmClientBuilder;
pub use self::core::VllmClient;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::params::ModelParameters;
use crate::schema::ModelSchema;
use crate::types::{Credentials, LlmResult, LlmResultChunk, PromptMessage, PromptMessageTool};
use crate::{BoxStream, Result};

/// Arguments of one completion call.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub model: String,
    pub credentials: Credentials,
    pub prompt_messages: Vec<PromptMessage>,
    pub model_parameters: ModelParameters,
    pub tools: Option<Vec<PromptMessageTool>>,
    pub stop: Option<Vec<String>>,
    pub stream: bool,
    pub user: Option<String>,
}

impl InvokeRequest {
    /// A streaming request with empty credentials and parameters.
    pub fn new(model: impl Into<String>, prompt_messages: Vec<PromptMessage>) -> Self {
        Self {
            model: model.into(),
            credentials: Credentials::new(),
            prompt_messages,
            model_parameters: ModelParameters::default(),
            tools: None,
            stop: None,
            stream: true,
            user: None,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn model_parameters(mut self, params: ModelParameters) -> Self {
        self.model_parameters = params;
        self
    }

    pub fn tools(mut self, tools: Vec<PromptMessageTool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Result of a completion call: a whole completion, or a one-way stream of
/// fragments that ends when the inner client finishes.
pub enum InvokeResponse {
    Completion(LlmResult),
    Stream(BoxStream<'static, LlmResultChunk>),
}

impl InvokeResponse {
    pub fn is_stream(&self) -> bool {
        matches!(self, InvokeResponse::Stream(_))
    }

    pub fn into_completion(self) -> Option<LlmResult> {
        match self {
            InvokeResponse::Completion(r) => Some(r),
            InvokeResponse::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<BoxStream<'static, LlmResultChunk>> {
        match self {
            InvokeResponse::Stream(s) => Some(s),
            InvokeResponse::Completion(_) => None,
        }
    }
}

impl fmt::Debug for InvokeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeResponse::Completion(r) => f.debug_tuple("Completion").field(r).finish(),
            InvokeResponse::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An OpenAI-compatible chat completion client.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse>;

    /// Schema of a user-configured model.
    async fn customizable_model_schema(
        &self,
        model: &str,
        credentials: &Credentials,
    ) -> Result<ModelSchema>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse> {
        (**self).invoke(request).await
    }

    async fn customizable_model_schema(
        &self,
        model: &str,
        credentials: &Credentials,
    ) -> Result<ModelSchema> {
        (**self).customizable_model_schema(model, credentials).await
    }
}

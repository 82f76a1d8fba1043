use async_trait::async_trait;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::{CompletionClient, InvokeRequest, InvokeResponse, VllmClientBuilder};
use crate::guided::{GuidedParameterExtractor, NormalizeOutcome};
use crate::schema::{augment_schema, ModelSchema};
use crate::types::Credentials;
use crate::Result;

/// Wraps an OpenAI-compatible client and speaks the vLLM parameter dialect.
///
/// Every call is normalized first (directive extraction, `enable_thinking`,
/// `json_schema` alias), then handed to the inner client. The inner result,
/// streaming or not, is returned untouched, and inner errors propagate as-is.
pub struct VllmClient<C> {
    inner: C,
    extractor: GuidedParameterExtractor,
}

impl<C: CompletionClient> VllmClient<C> {
    /// Wrap `inner` with the default extraction policy.
    pub fn new(inner: C) -> Self {
        Self::with_extractor(inner, GuidedParameterExtractor::default())
    }

    pub fn builder() -> VllmClientBuilder {
        VllmClientBuilder::new()
    }

    pub(crate) fn with_extractor(inner: C, extractor: GuidedParameterExtractor) -> Self {
        Self { inner, extractor }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn extractor(&self) -> &GuidedParameterExtractor {
        &self.extractor
    }

    /// Rewrite `request` in place exactly as [`CompletionClient::invoke`] would
    /// before delegating.
    pub fn prepare(&self, request: &mut InvokeRequest) -> NormalizeOutcome {
        self.extractor
            .normalize(&mut request.model_parameters, &mut request.prompt_messages)
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for VllmClient<C> {
    async fn invoke(&self, mut request: InvokeRequest) -> Result<InvokeResponse> {
        let request_id = Uuid::new_v4();
        let span = info_span!("vllm_invoke", %request_id, model = %request.model);

        async move {
            info!("Model parameters: {:?}", request.model_parameters);
            debug!("Prompt messages: {:?}", request.prompt_messages);

            let outcome = self.prepare(&mut request);
            if let Some(kind) = outcome.directive {
                info!("Using {} directive from prompt message 1", kind);
            }

            info!("Request model parameters: {:?}", request.model_parameters);
            self.inner.invoke(request).await
        }
        .instrument(span)
        .await
    }

    async fn customizable_model_schema(
        &self,
        model: &str,
        credentials: &Credentials,
    ) -> Result<ModelSchema> {
        let mut schema = self
            .inner
            .customizable_model_schema(model, credentials)
            .await?;
        augment_schema(&mut schema);
        Ok(schema)
    }
}

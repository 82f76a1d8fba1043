use super::{CompletionClient, VllmClient};
use crate::guided::{DirectiveExtraction, GuidedParameterExtractor};
use crate::Result;

/// Builder for [`VllmClient`].
///
/// Keep this surface small; the only knob is when directive extraction runs.
#[derive(Debug, Clone, Default)]
pub struct VllmClientBuilder {
    directive_extraction: DirectiveExtraction,
}

impl VllmClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the environment.
    ///
    /// - `VLLM_COMPAT_DIRECTIVE_EXTRACTION`: `always` or `opt-in` (default `opt-in`)
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            directive_extraction: DirectiveExtraction::from_env()?,
        })
    }

    /// Decide whether directive extraction runs for requests that do not set
    /// `dynamic_request_guided`.
    pub fn directive_extraction(mut self, policy: DirectiveExtraction) -> Self {
        self.directive_extraction = policy;
        self
    }

    pub fn build<C: CompletionClient>(self, inner: C) -> VllmClient<C> {
        VllmClient::with_extractor(inner, GuidedParameterExtractor::new(self.directive_extraction))
    }
}

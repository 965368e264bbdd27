//! The provider contract the engine drives models through.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use futures::stream;

use super::error::ModelError;
use super::types::{ModelRequest, ModelResponse, StreamFragment};

/// Fragments produced by a streaming invocation.
pub type ModelStream = Pin<Box<dyn Stream<Item = Result<StreamFragment, ModelError>> + Send>>;

/// A model backend. Implementations translate [`ModelRequest`] into their
/// vendor wire format and back.
///
/// `invoke_streamed` has a default adapter that performs a blocking
/// invocation and replays it as fragments, so non-streaming providers only
/// implement `invoke`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// A short identifier used in logs.
    fn name(&self) -> &str;

    /// Run one complete model invocation.
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Run one invocation, yielding fragments as they arrive.
    async fn invoke_streamed(&self, request: &ModelRequest) -> Result<ModelStream, ModelError> {
        let response = self.invoke(request).await?;

        let mut fragments = Vec::new();
        if !response.text.is_empty() {
            fragments.push(Ok(StreamFragment::TextDelta(response.text)));
        }
        if !response.proposed_calls.is_empty() {
            fragments.push(Ok(StreamFragment::ProposedCalls(response.proposed_calls)));
        }
        fragments.push(Ok(StreamFragment::Done {
            usage: response.usage,
        }));

        Ok(Box::pin(stream::iter(fragments)))
    }
}

/// Shared handle to a provider.
pub type SharedModelProvider = Arc<dyn ModelProvider>;

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::llm::types::{ProposedToolCall, Usage};

    struct CannedProvider {
        response: ModelResponse,
    }

    #[async_trait]
    impl ModelProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn invoke(&self, _request: &ModelRequest) -> Result<ModelResponse, ModelError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn default_streaming_replays_full_response() {
        let provider = CannedProvider {
            response: ModelResponse::text("hello")
                .with_calls(vec![ProposedToolCall::new("echo", Default::default())])
                .with_usage(Usage {
                    prompt_tokens: 3,
                    completion_tokens: 2,
                    total_tokens: 5,
                }),
        };

        let request = ModelRequest::new(Vec::new());
        let mut stream = provider.invoke_streamed(&request).await.unwrap();

        let mut fragments = Vec::new();
        while let Some(fragment) = stream.next().await {
            fragments.push(fragment.unwrap());
        }

        assert_eq!(fragments.len(), 3);
        assert!(matches!(&fragments[0], StreamFragment::TextDelta(t) if t == "hello"));
        assert!(matches!(&fragments[1], StreamFragment::ProposedCalls(c) if c.len() == 1));
        assert!(matches!(
            &fragments[2],
            StreamFragment::Done { usage: Some(u) } if u.total_tokens == 5
        ));
    }

    #[tokio::test]
    async fn default_streaming_skips_empty_sections() {
        let provider = CannedProvider {
            response: ModelResponse::text(""),
        };

        let request = ModelRequest::new(Vec::new());
        let mut stream = provider.invoke_streamed(&request).await.unwrap();

        let mut fragments = Vec::new();
        while let Some(fragment) = stream.next().await {
            fragments.push(fragment.unwrap());
        }

        assert_eq!(fragments.len(), 1);
        assert!(matches!(&fragments[0], StreamFragment::Done { usage: None }));
    }
}

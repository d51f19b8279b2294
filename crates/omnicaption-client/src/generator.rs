//! Seam between the session state machine and the transport

use async_trait::async_trait;

use crate::client::CaptionClient;
use crate::error::Result;
use crate::types::{CaptionsResponse, GenerationRequest};

/// Anything that can turn a request into captions
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    /// Generate captions for one request
    async fn generate(&self, request: &GenerationRequest) -> Result<CaptionsResponse>;
}

#[async_trait]
impl CaptionGenerator for CaptionClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<CaptionsResponse> {
        Self::generate(self, request).await
    }
}

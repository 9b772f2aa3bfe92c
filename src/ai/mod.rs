//! Model host integration for scene description
//!
//! Provides the [`ModelHost`] capability used by both handlers, a Gemini REST
//! implementation for the Generative Language API and Vertex AI, and a mock
//! for tests.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiEndpoint, GeminiModelHost};
pub use mock::MockModelHost;

use crate::models::{GenerationSettings, MediaPart};
use crate::Result;
use async_trait::async_trait;

/// A single prompt + media generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub media: MediaPart,
    pub settings: GenerationSettings,
}

#[async_trait]
pub trait ModelHost: Send + Sync {
    /// Runs the request and returns the text of the first candidate's first part.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

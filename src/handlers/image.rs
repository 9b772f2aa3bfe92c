use super::describe;
use crate::ai::ModelHost;
use crate::models::{ImageRequest, MediaPart, ModelAnswer, QueryAnswerMode};
use crate::prompts::Prompts;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Describes inline image bytes.
///
/// The host is absent when no API key was configured; requests then fail
/// with a configuration error without reaching the model.
pub struct ImageHandler {
    host: Option<Arc<dyn ModelHost>>,
    prompts: Arc<Prompts>,
    answer_mode: QueryAnswerMode,
}

impl ImageHandler {
    pub fn new(host: Option<Arc<dyn ModelHost>>, prompts: Arc<Prompts>) -> Self {
        Self {
            host,
            prompts,
            answer_mode: QueryAnswerMode::default(),
        }
    }

    pub fn with_answer_mode(mut self, answer_mode: QueryAnswerMode) -> Self {
        self.answer_mode = answer_mode;
        self
    }

    pub async fn handle(&self, request: ImageRequest) -> Result<ModelAnswer> {
        let span = tracing::info_span!("image", request_id = %Uuid::new_v4());

        async move {
            tracing::info!(
                "Received image request ({} bytes, mime type '{}')",
                request.data.len(),
                request.mime_type
            );

            let host = self.host.as_deref().ok_or_else(|| {
                tracing::error!("GOOGLE_API_KEY is not configured");
                Error::Configuration("GOOGLE_API_KEY is not set".to_string())
            })?;

            let media = MediaPart::Inline {
                mime_type: request.mime_type,
                data: request.data,
            };

            describe(
                host,
                &self.prompts.image_describe,
                media,
                request.query.as_deref(),
                self.answer_mode,
            )
            .await
        }
        .instrument(span)
        .await
    }
}

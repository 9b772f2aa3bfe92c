use super::describe;
use crate::ai::ModelHost;
use crate::models::{MediaPart, ModelAnswer, QueryAnswerMode, VideoRequest};
use crate::prompts::Prompts;
use crate::storage::{convert_to_storage_locator, without_query};
use crate::Result;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Describes a previously uploaded video by handing the model a storage locator.
pub struct VideoHandler {
    host: Arc<dyn ModelHost>,
    prompts: Arc<Prompts>,
    answer_mode: QueryAnswerMode,
}

impl VideoHandler {
    pub fn new(host: Arc<dyn ModelHost>, prompts: Arc<Prompts>) -> Self {
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

    pub async fn handle(&self, request: VideoRequest) -> Result<ModelAnswer> {
        let span = tracing::info_span!("video", request_id = %Uuid::new_v4());

        async move {
            tracing::info!("Received video request for {}", without_query(&request.data));

            let file_uri = convert_to_storage_locator(&request.data).map_err(|e| {
                tracing::warn!("Rejecting video request: {}", e);
                e
            })?;
            tracing::info!("Resolved storage locator: {}", file_uri);

            let media = MediaPart::FileUri {
                mime_type: request.mime_type,
                file_uri,
            };

            describe(
                self.host.as_ref(),
                &self.prompts.video_describe,
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

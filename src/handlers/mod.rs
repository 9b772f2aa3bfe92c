//! Request handlers for image and video description
//!
//! Both handlers share one shape: pick the prompt and generation settings
//! from the presence of a query, make a single model call, and normalize the
//! returned text into a [`ModelAnswer`].

pub mod image;
pub mod video;

pub use image::ImageHandler;
pub use video::VideoHandler;

use crate::ai::{GenerationRequest, ModelHost};
use crate::models::{
    effective_query, GenerationSettings, MediaPart, ModelAnswer, OutputFormat, QueryAnswerMode,
    SceneDescription,
};
use crate::{Error, Result};
use tracing::{debug, info};

/// Prompt, invoke and parse for one request.
pub(crate) async fn describe(
    host: &dyn ModelHost,
    describe_prompt: &str,
    media: MediaPart,
    query: Option<&str>,
    answer_mode: QueryAnswerMode,
) -> Result<ModelAnswer> {
    let query = effective_query(query);
    let settings = GenerationSettings::for_query(query);
    let prompt = query.unwrap_or(describe_prompt).to_string();

    debug!(
        "Invoking model host (query present: {}, output: {:?})",
        query.is_some(),
        settings.output_format
    );
    let text = host
        .generate(&GenerationRequest {
            prompt,
            media,
            settings,
        })
        .await?;

    info!("Model response ({} chars): {}", text.len(), text);

    parse_answer(&text, settings.output_format, answer_mode)
}

/// Turn model text into the answer shape implied by the requested output format.
pub fn parse_answer(
    text: &str,
    output_format: OutputFormat,
    answer_mode: QueryAnswerMode,
) -> Result<ModelAnswer> {
    match (output_format, answer_mode) {
        (OutputFormat::Json, _) => {
            debug!("Parsing scene description JSON");
            serde_json::from_str::<SceneDescription>(text)
                .map(ModelAnswer::Scene)
                .map_err(|e| {
                    Error::ResponseParse(format!("Model output is not a scene description: {}", e))
                })
        }
        (OutputFormat::PlainText, QueryAnswerMode::Text) => Ok(ModelAnswer::Text(text.to_string())),
        (OutputFormat::PlainText, QueryAnswerMode::Json) => serde_json::from_str(text)
            .map(ModelAnswer::Json)
            .map_err(|e| Error::ResponseParse(format!("Model output is not JSON: {}", e))),
    }
}

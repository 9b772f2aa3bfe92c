use super::client::{GeminiEndpoint, GeminiHttpClient};
use super::types::{
    Content, FileData, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, Part,
};
use crate::ai::{GenerationRequest, ModelHost};
use crate::models::MediaPart;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// [`ModelHost`] backed by Gemini's REST `generateContent` method.
pub struct GeminiModelHost {
    http: GeminiHttpClient,
}

impl GeminiModelHost {
    pub fn new(endpoint: GeminiEndpoint, model: String, timeout: Duration) -> Self {
        Self::new_with_client(endpoint, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        endpoint: GeminiEndpoint,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(endpoint, model, timeout, client),
        }
    }

    /// Point the host at a different API root, e.g. a regional proxy or a test server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let media = match &request.media {
            MediaPart::Inline { mime_type, data } => {
                use base64::Engine as _;
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(data),
                    },
                }
            }
            MediaPart::FileUri {
                mime_type,
                file_uri,
            } => Part::FileData {
                file_data: FileData {
                    mime_type: mime_type.clone(),
                    file_uri: file_uri.clone(),
                },
            },
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    media,
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.settings.max_output_tokens,
                temperature: request.settings.temperature,
                response_mime_type: request.settings.output_format.mime_type().to_string(),
            },
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            Error::ModelInvocation(match &response.prompt_feedback {
                Some(feedback) => format!("Gemini returned no candidates: {}", feedback),
                None => "Gemini returned no candidates".to_string(),
            })
        })?;

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        match candidate.content.and_then(|c| c.parts.into_iter().next()) {
            Some(Part::Text { text }) => Ok(text),
            Some(_) => Err(Error::ResponseParse(
                "First Gemini response part is not text".to_string(),
            )),
            None => Err(Error::ResponseParse(format!(
                "Gemini candidate has no content (finish reason: {})",
                finish_reason
            ))),
        }
    }
}

#[async_trait]
impl ModelHost for GeminiModelHost {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tracing::debug!(
            "Generating with {} ({:?} output, media {})",
            self.http.model(),
            request.settings.output_format,
            request.media.mime_type()
        );

        let body = Self::build_request(request);
        let response: GenerateContentResponse = self.http.generate_content(&body).await?;
        Self::extract_text(response)
    }
}

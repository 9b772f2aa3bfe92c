use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Where `generateContent` calls go and how they authenticate.
#[derive(Clone)]
pub enum GeminiEndpoint {
    /// Generative Language API, authenticated with an API key.
    Developer { api_key: String },
    /// Vertex AI, bound to one project and region.
    Vertex {
        project: String,
        location: String,
        access_token: Option<String>,
    },
}

impl std::fmt::Debug for GeminiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeminiEndpoint::Developer { .. } => f.debug_struct("Developer").finish_non_exhaustive(),
            GeminiEndpoint::Vertex {
                project, location, ..
            } => f
                .debug_struct("Vertex")
                .field("project", project)
                .field("location", location)
                .finish_non_exhaustive(),
        }
    }
}

impl GeminiEndpoint {
    fn default_base_url(&self) -> String {
        match self {
            GeminiEndpoint::Developer { .. } => DEFAULT_BASE_URL.to_string(),
            GeminiEndpoint::Vertex { location, .. } => {
                format!("https://{}-aiplatform.googleapis.com", location)
            }
        }
    }
}

/// Lightweight Gemini REST client.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    endpoint: GeminiEndpoint,
    model: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-1.5-flash`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(endpoint: GeminiEndpoint, model: String, timeout: Duration) -> Self {
        Self::new_with_client(endpoint, model, timeout, Client::new())
    }

    pub fn new_with_client(
        endpoint: GeminiEndpoint,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        let base_url = endpoint.default_base_url();

        Self {
            client,
            endpoint,
            model,
            base_url,
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &GeminiEndpoint {
        &self.endpoint
    }

    pub(crate) fn generate_content_url(&self) -> String {
        match &self.endpoint {
            GeminiEndpoint::Developer { .. } => format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
            GeminiEndpoint::Vertex {
                project, location, ..
            } => format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                self.base_url, project, location, self.model
            ),
        }
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let builder = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json");

        let builder = match &self.endpoint {
            GeminiEndpoint::Developer { api_key } => builder.header("x-goog-api-key", api_key),
            GeminiEndpoint::Vertex {
                access_token: Some(token),
                ..
            } => builder.bearer_auth(token),
            GeminiEndpoint::Vertex {
                access_token: None, ..
            } => builder,
        };

        let response = builder.json(request).send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            Error::ModelInvocation(format!("Failed to reach Gemini: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            let hint = match (&self.endpoint, status) {
                (
                    GeminiEndpoint::Vertex { .. },
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN,
                ) => {
                    " (VERTEX_ACCESS_TOKEN is missing or expired; OAuth access tokens last about an hour)"
                }
                _ => "",
            };
            return Err(Error::ModelInvocation(format!(
                "Gemini API error (status {}): {}{}",
                status, error_text, hint
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::ModelInvocation(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls the endpoint's `generateContent` method.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = self.generate_content_url();
        tracing::debug!("Calling Gemini generateContent for model {}", self.model);
        self.post_to_url(url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_prefix_is_stripped() {
        let client = GeminiHttpClient::new(
            GeminiEndpoint::Developer {
                api_key: "k".to_string(),
            },
            "models/gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(client.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_developer_url() {
        let client = GeminiHttpClient::new(
            GeminiEndpoint::Developer {
                api_key: "k".to_string(),
            },
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(
            client.generate_content_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_vertex_url_is_regional() {
        let client = GeminiHttpClient::new(
            GeminiEndpoint::Vertex {
                project: "vision-crafters".to_string(),
                location: "us-central1".to_string(),
                access_token: None,
            },
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(
            client.generate_content_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/vision-crafters/locations/us-central1/publishers/google/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_credentials() {
        let endpoint = GeminiEndpoint::Developer {
            api_key: "secret-key".to_string(),
        };
        assert!(!format!("{:?}", endpoint).contains("secret-key"));

        let endpoint = GeminiEndpoint::Vertex {
            project: "p".to_string(),
            location: "l".to_string(),
            access_token: Some("secret-token".to_string()),
        };
        assert!(!format!("{:?}", endpoint).contains("secret-token"));
    }
}

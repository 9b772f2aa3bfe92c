//! Data models and structures
//!
//! Defines the per-request payloads, generation settings, model answers and
//! the environment-driven service configuration.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_VERTEX_PROJECT: &str = "vision-crafters";
pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

pub const MAX_OUTPUT_TOKENS: u32 = 1024;
pub const TEMPERATURE: f32 = 0.6;

/// Largest callable envelope accepted by the gateway, matching callable-function limits.
pub const MAX_CALLABLE_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Image request body: inline bytes (base64 on the wire).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default, deserialize_with = "deserialize_base64")]
    pub data: Vec<u8>,
    #[serde(default, alias = "mimeType", deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(default)]
    pub query: Option<String>,
}

/// Video request body: `data` is the download URL of an uploaded object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, alias = "mimeType", deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(default)]
    pub query: Option<String>,
}

fn deserialize_base64<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use base64::Engine as _;
    let Some(encoded) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(serde::de::Error::custom)
}

/// Callable clients send `null` for unset fields; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Returns the query only when it carries text; an empty query counts as absent.
pub fn effective_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}

/// Media handed to the model host, either inline or by reference.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaPart {
    Inline { mime_type: String, data: Vec<u8> },
    FileUri { mime_type: String, file_uri: String },
}

impl MediaPart {
    pub fn mime_type(&self) -> &str {
        match self {
            MediaPart::Inline { mime_type, .. } | MediaPart::FileUri { mime_type, .. } => {
                mime_type
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    PlainText,
    Json,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::PlainText => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub output_format: OutputFormat,
}

impl GenerationSettings {
    /// Plain text when the caller asked something, JSON for the fixed description prompt.
    pub fn for_query(query: Option<&str>) -> Self {
        let output_format = match effective_query(query) {
            Some(_) => OutputFormat::PlainText,
            None => OutputFormat::Json,
        };

        Self {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            output_format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Danger {
    Yes,
    No,
}

/// Answer to the fixed description prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    #[serde(rename = "Danger")]
    pub danger: Danger,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelAnswer {
    Text(String),
    Scene(SceneDescription),
    Json(serde_json::Value),
}

/// How an answer to a free-form query is returned.
///
/// `Json` keeps the historical behaviour of parsing the query answer as JSON,
/// which fails for ordinary natural-language replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryAnswerMode {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for QueryAnswerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(QueryAnswerMode::Text),
            "json" => Ok(QueryAnswerMode::Json),
            other => Err(Error::Configuration(format!(
                "QUERY_ANSWER_MODE must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub model: String,
    pub vertex_project: String,
    pub vertex_location: String,
    pub vertex_access_token: Option<String>,
    pub prompts_dir: Option<PathBuf>,
    pub query_answer_mode: QueryAnswerMode,
    pub model_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let query_answer_mode = match non_empty("QUERY_ANSWER_MODE") {
            Some(value) => value.parse()?,
            None => QueryAnswerMode::default(),
        };

        let model_timeout = match non_empty("MODEL_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(value.trim().parse().map_err(|_| {
                Error::Configuration(format!(
                    "MODEL_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    value
                ))
            })?),
            None => Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
        };

        Ok(Self {
            google_api_key: non_empty("GOOGLE_API_KEY"),
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vertex_project: non_empty("VERTEX_PROJECT")
                .unwrap_or_else(|| DEFAULT_VERTEX_PROJECT.to_string()),
            vertex_location: non_empty("VERTEX_LOCATION")
                .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_string()),
            vertex_access_token: non_empty("VERTEX_ACCESS_TOKEN"),
            prompts_dir: non_empty("PROMPTS_DIR").map(PathBuf::from),
            query_answer_mode,
            model_timeout,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

//! Application wiring: configuration in, handlers and HTTP gateway out.

use crate::ai::{GeminiEndpoint, GeminiModelHost, ModelHost};
use crate::handlers::{ImageHandler, VideoHandler};
use crate::models::{Config, QueryAnswerMode};
use crate::prompts::Prompts;
use crate::server::{self, AppState};
use crate::Result;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the configured handlers and serves them over the callable gateway.
pub struct App {
    state: AppState,
    bind_addr: String,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    /// `None` when no API key is configured for the image model.
    pub image_host: Option<Arc<dyn ModelHost>>,
    pub video_host: Arc<dyn ModelHost>,
    pub prompts: Prompts,
    pub query_answer_mode: QueryAnswerMode,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, bind_addr: String) -> Self {
        let prompts = Arc::new(services.prompts);

        let image = ImageHandler::new(services.image_host, prompts.clone())
            .with_answer_mode(services.query_answer_mode);
        let video = VideoHandler::new(services.video_host, prompts)
            .with_answer_mode(services.query_answer_mode);

        Self {
            state: AppState {
                image: Arc::new(image),
                video: Arc::new(video),
            },
            bind_addr,
        }
    }

    /// Construct an app from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let prompts = Prompts::load(config.prompts_dir.as_deref())?;

        // Reuse one HTTP connection pool across both model hosts.
        let http_client = reqwest::Client::new();

        let image_host: Option<Arc<dyn ModelHost>> = match &config.google_api_key {
            Some(api_key) => {
                info!("Image model: Gemini API (model: {})", config.model);
                Some(Arc::new(GeminiModelHost::new_with_client(
                    GeminiEndpoint::Developer {
                        api_key: api_key.clone(),
                    },
                    config.model.clone(),
                    config.model_timeout,
                    http_client.clone(),
                )) as Arc<dyn ModelHost>)
            }
            None => {
                warn!("GOOGLE_API_KEY not set; image requests will fail until it is configured");
                None
            }
        };

        info!(
            "Video model: Vertex AI (project: {}, location: {}, model: {})",
            config.vertex_project, config.vertex_location, config.model
        );
        if config.vertex_access_token.is_none() {
            warn!("VERTEX_ACCESS_TOKEN not set; Vertex AI requests are sent unauthenticated");
        }
        let video_host: Arc<dyn ModelHost> = Arc::new(GeminiModelHost::new_with_client(
            GeminiEndpoint::Vertex {
                project: config.vertex_project.clone(),
                location: config.vertex_location.clone(),
                access_token: config.vertex_access_token.clone(),
            },
            config.model.clone(),
            config.model_timeout,
            http_client,
        ));

        if config.query_answer_mode == QueryAnswerMode::Json {
            warn!("QUERY_ANSWER_MODE=json: free-form query answers must be valid JSON");
        }

        Ok(Self::with_services(
            AppServices {
                image_host,
                video_host,
                prompts,
                query_answer_mode: config.query_answer_mode,
            },
            config.bind_addr.clone(),
        ))
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    pub fn router(&self) -> Router {
        server::create_router(self.state.clone())
    }

    pub fn image_handler(&self) -> &ImageHandler {
        &self.state.image
    }

    pub fn video_handler(&self) -> &VideoHandler {
        &self.state.video
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr.as_str()).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

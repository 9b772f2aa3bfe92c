//! Scene description service for visually impaired users
//!
//! Forwards an image or an uploaded video, plus an optional question, to a
//! hosted multimodal Gemini model. Without a question the model is asked for a
//! `{Danger, Title, Description}` assessment; with one, its plain-text answer
//! is returned.

pub mod ai;
pub mod app;
pub mod error;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod server;
pub mod storage;

pub use error::{Error, Result};

pub mod client;
pub mod host;
pub mod types;

pub use client::{GeminiEndpoint, GeminiHttpClient};
pub use host::GeminiModelHost;

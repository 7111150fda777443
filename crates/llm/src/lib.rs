//! Smart Tagging LLM
//!
//! Provides a provider abstraction for the classification engine's AI path:
//! - `LlmProvider` trait
//! - OpenAI-compatible chat-completions provider (Groq by default)
//! - HTTP client factory

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;

//! Completion-service abstraction layer for nfx.
//!
//! This crate provides a unified, blocking interface for asking a language
//! model to complete a prompt:
//! - `OpenAiBackend` talks to an OpenAI-compatible chat-completions endpoint
//! - `ScriptedBackend` returns canned replies for tests and dry runs

mod backend;
mod error;
mod message;

pub use backend::openai::{CompletionOptions, OpenAiBackend, API_KEY_ENV, DEFAULT_BASE_URL};
pub use backend::scripted::ScriptedBackend;
pub use backend::CompletionBackend;
pub use error::CompletionError;
pub use message::{ChatRequest, ChatResponse, Message};

/// Result type for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

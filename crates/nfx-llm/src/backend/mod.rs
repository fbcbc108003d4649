//! Completion backend implementations.

pub mod openai;
pub mod scripted;

use crate::Result;

/// Trait for text-in/text-out completion services.
///
/// Calls are blocking and must not be made from inside an async runtime.
pub trait CompletionBackend: Send + Sync {
    /// Ask the model to answer `prompt` while playing `system_role`.
    ///
    /// # Returns
    /// The raw reply text, which may wrap the requested JSON in commentary.
    fn complete(&self, system_role: &str, prompt: &str) -> Result<String>;

    /// Model identifier used for logging.
    fn model(&self) -> &str;
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for &B {
    fn complete(&self, system_role: &str, prompt: &str) -> Result<String> {
        (**self).complete(system_role, prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for Box<B> {
    fn complete(&self, system_role: &str, prompt: &str) -> Result<String> {
        (**self).complete(system_role, prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

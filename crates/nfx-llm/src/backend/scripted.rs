//! Deterministic backend returning canned replies.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::CompletionError;
use crate::{CompletionBackend, Result};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Backend that answers from a script instead of the network.
///
/// Rules are checked in insertion order; the first rule whose needle occurs
/// in the prompt decides the reply. Otherwise the default reply is used.
///
/// ```
/// use nfx_llm::{CompletionBackend, ScriptedBackend};
///
/// let backend = ScriptedBackend::new("{}")
///     .with_reply("NF 123", r#"{"numero_nf":"123"}"#)
///     .with_failure("quota", "insufficient_quota");
///
/// assert_eq!(backend.complete("role", "... NF 123 ...").unwrap(), r#"{"numero_nf":"123"}"#);
/// assert!(backend.complete("role", "over quota").is_err());
/// assert_eq!(backend.complete("role", "other").unwrap(), "{}");
/// assert_eq!(backend.call_count(), 3);
/// ```
#[derive(Debug)]
pub struct ScriptedBackend {
    default_reply: Reply,
    rules: Vec<(String, Reply)>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    /// Backend answering every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_default(Reply::Text(reply.into()))
    }

    /// Backend failing every prompt unless a rule matches.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_default(Reply::Fail(message.into()))
    }

    fn with_default(default_reply: Reply) -> Self {
        Self {
            default_reply,
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `reply` when the prompt contains `needle`.
    pub fn with_reply(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// Fail with an API error when the prompt contains `needle`.
    pub fn with_failure(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Fail(message.into())));
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, _system_role: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.prompts.lock() {
            Ok(mut prompts) => prompts.push(prompt.to_string()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_string()),
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default_reply);

        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(CompletionError::Api {
                status: 500,
                message: message.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_matching_rule_wins() {
        let backend = ScriptedBackend::new("default")
            .with_reply("abc", "first")
            .with_reply("ab", "second");

        assert_eq!(backend.complete("r", "xxabcxx").unwrap(), "first");
        assert_eq!(backend.complete("r", "xxabxx").unwrap(), "second");
        assert_eq!(backend.complete("r", "zzz").unwrap(), "default");
    }

    #[test]
    fn test_failing_default() {
        let backend = ScriptedBackend::failing("down").with_reply("ok", "fine");

        assert!(matches!(
            backend.complete("r", "anything"),
            Err(CompletionError::Api { status: 500, .. })
        ));
        assert_eq!(backend.complete("r", "ok").unwrap(), "fine");
    }

    #[test]
    fn test_records_prompts() {
        let backend = ScriptedBackend::new("x");
        backend.complete("r", "one").unwrap();
        backend.complete("r", "two").unwrap();

        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.prompts(), vec!["one".to_string(), "two".to_string()]);
    }
}

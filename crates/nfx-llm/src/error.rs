//! Error types for the completion layer.

use thiserror::Error;

/// Errors that can occur while asking the completion service for a reply.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Missing credential or invalid client settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failure or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response (authentication, quota, invalid request).
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The service answered without any message content.
    #[error("empty reply from completion service")]
    EmptyReply,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CompletionError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): quota exceeded");
        assert_eq!(
            CompletionError::Config("OPENAI_API_KEY not set".into()).to_string(),
            "configuration error: OPENAI_API_KEY not set"
        );
    }
}

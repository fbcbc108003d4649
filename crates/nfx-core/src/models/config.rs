//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nfx_llm::{CompletionOptions, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Role given to the model on every request.
pub const DEFAULT_SYSTEM_ROLE: &str = "Você é um especialista em análise de Notas Fiscais brasileiras";

/// Main configuration for the nfx pipeline.
///
/// The API credential is deliberately absent; it is read from the
/// environment when the completion backend is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfxConfig {
    /// Completion service configuration.
    pub completion: CompletionConfig,

    /// Document and prompt configuration.
    pub extraction: ExtractionConfig,

    /// Output artifact configuration.
    pub output: OutputConfig,
}

/// Completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Model identifier.
    pub model: String,

    /// API root of an OpenAI-compatible service.
    pub base_url: String,

    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// System role sent with every prompt.
    pub system_role: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            timeout_secs: 120,
            system_role: DEFAULT_SYSTEM_ROLE.to_string(),
        }
    }
}

impl CompletionConfig {
    /// Backend settings derived from this section.
    pub fn options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Document and prompt configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters of document text embedded in the prompt.
    pub max_text_chars: usize,

    /// Line items kept per record.
    pub max_line_items: usize,

    /// File extension of input documents, without the dot.
    pub extension: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 5000,
            max_line_items: 3,
            extension: "pdf".to_string(),
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Tabular output path; the detailed JSON goes next to it.
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("outputs").join("resultados_nfs.csv"),
        }
    }
}

impl NfxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

//! Parsing sanitized model replies into invoice records.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, error};

use super::Result;
use crate::error::ExtractionError;
use crate::models::invoice::InvoiceRecord;

/// Strict JSON parser for model replies.
#[derive(Debug, Clone)]
pub struct RecordParser {
    /// Line items kept per record.
    max_line_items: usize,
}

impl RecordParser {
    /// Create a parser keeping at most `max_line_items` items.
    pub fn new(max_line_items: usize) -> Self {
        Self { max_line_items }
    }

    /// Parse `candidate` and stamp it with the pipeline-owned fields.
    ///
    /// A failure is logged (message at error level, offending text at debug)
    /// and returned; it never concerns more than the current document.
    pub fn parse(
        &self,
        candidate: &str,
        source_file: &str,
        processed_at: NaiveDateTime,
    ) -> Result<InvoiceRecord> {
        match self.parse_record(candidate) {
            Ok(mut record) => {
                record.stamp(source_file, processed_at);
                Ok(record)
            }
            Err(e) => {
                error!("Failed to parse JSON reply for {}: {}", source_file, e);
                debug!("Reply received: {}", candidate);
                Err(e)
            }
        }
    }

    fn parse_record(&self, candidate: &str) -> Result<InvoiceRecord> {
        let value: Value = serde_json::from_str(candidate).map_err(|e| malformed(e, candidate))?;

        // serde would otherwise accept a JSON array as a positional struct
        if !value.is_object() {
            return Err(ExtractionError::MalformedReply {
                message: format!("expected a JSON object, found {}", kind(&value)),
                reply: candidate.to_string(),
            });
        }

        let mut record: InvoiceRecord =
            serde_json::from_value(value).map_err(|e| malformed(e, candidate))?;

        if record.items.len() > self.max_line_items {
            debug!(
                "Keeping {} of {} line items",
                self.max_line_items,
                record.items.len()
            );
            record.items.truncate(self.max_line_items);
        }

        Ok(record)
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(3)
    }
}

fn malformed(e: serde_json::Error, candidate: &str) -> ExtractionError {
    ExtractionError::MalformedReply {
        message: e.to_string(),
        reply: candidate.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::sanitize_reply;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_micro_opt(9, 30, 0, 42)
            .unwrap()
    }

    #[test]
    fn test_parse_stamps_record() {
        let parser = RecordParser::default();
        let record = parser.parse(r#"{"numero_nf":"7"}"#, "nf7.pdf", at()).unwrap();

        assert_eq!(record.invoice_number, "7");
        assert_eq!(record.source_file, "nf7.pdf");
        assert_eq!(record.processed_at, "2024-03-15T09:30:00.000042");
    }

    #[test]
    fn test_wrapped_reply_matches_direct_parse() {
        let parser = RecordParser::default();
        let inner = r#"{"numero_nf":"123","cnpj_emitente":"12.345.678/0001-90","itens":[{"descricao":"Café torrado","quantidade":"2"}]}"#;
        let raw = format!("Claro! Segue o JSON:\n{}\nQualquer dúvida, estou à disposição.", inner);

        let direct = parser.parse(inner, "a.pdf", at()).unwrap();
        let wrapped = parser.parse(sanitize_reply(&raw), "a.pdf", at()).unwrap();
        assert_eq!(wrapped, direct);
    }

    #[test]
    fn test_garbage_is_error() {
        let parser = RecordParser::default();
        let raw = "Desculpe, não consegui ler a nota.";

        let err = parser.parse(sanitize_reply(raw), "c.pdf", at()).unwrap_err();
        match err {
            ExtractionError::MalformedReply { reply, .. } => assert_eq!(reply, raw),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_json_is_error() {
        let parser = RecordParser::default();
        assert!(parser.parse(r#"{"numero_nf": "1", "itens": [{"#, "t.pdf", at()).is_err());
    }

    #[test]
    fn test_array_reply_is_error() {
        let parser = RecordParser::default();
        let err = parser.parse(r#"["123", "2024-01-01"]"#, "arr.pdf", at()).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_odd_items_keep_the_record() {
        let parser = RecordParser::default();
        let replies = [
            (r#"{"numero_nf":"5","itens":"nenhum"}"#, 0),
            (r#"{"numero_nf":"5","itens":{}}"#, 0),
            (r#"{"numero_nf":"5","itens":["Parafuso",null]}"#, 1),
        ];

        for (reply, expected_items) in replies {
            let record = parser.parse(reply, "odd.pdf", at()).unwrap();
            assert_eq!(record.invoice_number, "5", "reply: {}", reply);
            assert_eq!(record.items.len(), expected_items, "reply: {}", reply);
        }
    }

    #[test]
    fn test_items_capped() {
        let parser = RecordParser::new(2);
        let reply = r#"{"itens":[{"descricao":"a"},{"descricao":"b"},{"descricao":"c"}]}"#;
        let record = parser.parse(reply, "i.pdf", at()).unwrap();

        let descriptions: Vec<_> = record.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "b"]);
    }

    #[test]
    fn test_model_cannot_override_pipeline_fields() {
        let parser = RecordParser::default();
        let reply = r#"{"arquivo_origem":"forged.pdf","data_processamento":"ontem"}"#;
        let record = parser.parse(reply, "real.pdf", at()).unwrap();

        assert_eq!(record.source_file, "real.pdf");
        assert_eq!(record.processed_at, "2024-03-15T09:30:00.000042");
    }
}

//! Invoice record extracted from a Nota Fiscal.
//!
//! Field names on the wire are the Portuguese keys the model is asked to
//! produce; every scalar is kept as text exactly as the model wrote it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level keys the model is asked to fill, in prompt order.
pub const HEADER_FIELDS: [&str; 9] = [
    "numero_nf",
    "data_emissao",
    "cnpj_emitente",
    "razao_social_emitente",
    "cnpj_destinatario",
    "razao_social_destinatario",
    "valor_total",
    "valor_icms",
    "valor_ipi",
];

/// Keys of each line item.
pub const ITEM_FIELDS: [&str; 4] = ["descricao", "quantidade", "valor_unitario", "valor_total"];

/// Key holding the line items.
pub const ITEMS_FIELD: &str = "itens";

/// Keys appended by the pipeline rather than the model.
pub const SOURCE_FILE_FIELD: &str = "arquivo_origem";
pub const PROCESSED_AT_FIELD: &str = "data_processamento";

/// Timestamp layout of `data_processamento` (local time, microseconds).
pub const PROCESSED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Structured data of one successfully parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice number (número da NF).
    #[serde(rename = "numero_nf", default, deserialize_with = "lenient_string")]
    pub invoice_number: String,

    /// Issue date as printed on the document.
    #[serde(rename = "data_emissao", default, deserialize_with = "lenient_string")]
    pub issue_date: String,

    /// Issuer CNPJ.
    #[serde(rename = "cnpj_emitente", default, deserialize_with = "lenient_string")]
    pub issuer_tax_id: String,

    /// Issuer legal name (razão social).
    #[serde(rename = "razao_social_emitente", default, deserialize_with = "lenient_string")]
    pub issuer_name: String,

    /// Recipient CNPJ, empty for consumers without one.
    #[serde(rename = "cnpj_destinatario", default, deserialize_with = "lenient_string")]
    pub recipient_tax_id: String,

    /// Recipient legal name.
    #[serde(rename = "razao_social_destinatario", default, deserialize_with = "lenient_string")]
    pub recipient_name: String,

    /// Invoice total.
    #[serde(rename = "valor_total", default, deserialize_with = "lenient_string")]
    pub total_value: String,

    /// ICMS amount.
    #[serde(rename = "valor_icms", default, deserialize_with = "lenient_string")]
    pub icms_value: String,

    /// IPI amount.
    #[serde(rename = "valor_ipi", default, deserialize_with = "lenient_string")]
    pub ipi_value: String,

    /// First line items of the document.
    #[serde(rename = "itens", default, deserialize_with = "lenient_items")]
    pub items: Vec<LineItem>,

    /// Base name of the source document.
    #[serde(rename = "arquivo_origem", default, deserialize_with = "lenient_string")]
    pub source_file: String,

    /// When the document was processed.
    #[serde(rename = "data_processamento", default, deserialize_with = "lenient_string")]
    pub processed_at: String,
}

/// A single product/service line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "descricao", default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(rename = "quantidade", default, deserialize_with = "lenient_string")]
    pub quantity: String,

    #[serde(rename = "valor_unitario", default, deserialize_with = "lenient_string")]
    pub unit_value: String,

    #[serde(rename = "valor_total", default, deserialize_with = "lenient_string")]
    pub total_value: String,
}

impl InvoiceRecord {
    /// Set the pipeline-owned fields.
    pub fn stamp(&mut self, source_file: impl Into<String>, processed_at: NaiveDateTime) {
        self.source_file = source_file.into();
        self.processed_at = processed_at.format(PROCESSED_AT_FORMAT).to_string();
    }

    /// Header fields in `HEADER_FIELDS` order.
    pub fn header_values(&self) -> [&str; 9] {
        [
            self.invoice_number.as_str(),
            self.issue_date.as_str(),
            self.issuer_tax_id.as_str(),
            self.issuer_name.as_str(),
            self.recipient_tax_id.as_str(),
            self.recipient_name.as_str(),
            self.total_value.as_str(),
            self.icms_value.as_str(),
            self.ipi_value.as_str(),
        ]
    }

    /// Header fields the model left empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        HEADER_FIELDS
            .iter()
            .zip(self.header_values())
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Accept any JSON scalar where text is expected.
///
/// `null` becomes the empty string, numbers and booleans their literal text;
/// arrays and objects are kept as compact JSON.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// Accept whatever the model put under `itens`.
///
/// Anything but an array yields no items. Inside an array, objects become
/// items, a bare string becomes an item with only a description, and any
/// other element is dropped.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let elements = match Value::deserialize(deserializer)? {
        Value::Array(elements) => elements,
        _ => return Ok(Vec::new()),
    };

    Ok(elements
        .into_iter()
        .filter_map(|element| match element {
            Value::Object(_) => serde_json::from_value(element).ok(),
            Value::String(description) if !description.trim().is_empty() => Some(LineItem {
                description,
                ..Default::default()
            }),
            _ => None,
        })
        .collect())
}

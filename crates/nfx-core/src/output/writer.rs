//! Tabular and detailed result files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::error::OutputError;
use crate::models::invoice::InvoiceRecord;

/// Columns of the tabular file, in order.
pub const TABULAR_COLUMNS: [&str; 11] = [
    "arquivo_origem",
    "numero_nf",
    "data_emissao",
    "cnpj_emitente",
    "razao_social_emitente",
    "cnpj_destinatario",
    "razao_social_destinatario",
    "valor_total",
    "valor_icms",
    "valor_ipi",
    "data_processamento",
];

/// Artifacts actually written by `write_results`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Tabular file, if it was written.
    pub tabular: Option<PathBuf>,
    /// Detailed JSON file, if it was written.
    pub detailed: Option<PathBuf>,
}

impl WriteReport {
    /// Both artifacts were written.
    pub fn is_complete(&self) -> bool {
        self.tabular.is_some() && self.detailed.is_some()
    }
}

/// One flat row; line items are left out.
#[derive(Serialize)]
struct InvoiceRow<'a> {
    arquivo_origem: &'a str,
    numero_nf: &'a str,
    data_emissao: &'a str,
    cnpj_emitente: &'a str,
    razao_social_emitente: &'a str,
    cnpj_destinatario: &'a str,
    razao_social_destinatario: &'a str,
    valor_total: &'a str,
    valor_icms: &'a str,
    valor_ipi: &'a str,
    data_processamento: &'a str,
}

impl<'a> From<&'a InvoiceRecord> for InvoiceRow<'a> {
    fn from(record: &'a InvoiceRecord) -> Self {
        Self {
            arquivo_origem: &record.source_file,
            numero_nf: &record.invoice_number,
            data_emissao: &record.issue_date,
            cnpj_emitente: &record.issuer_tax_id,
            razao_social_emitente: &record.issuer_name,
            cnpj_destinatario: &record.recipient_tax_id,
            razao_social_destinatario: &record.recipient_name,
            valor_total: &record.total_value,
            valor_icms: &record.icms_value,
            valor_ipi: &record.ipi_value,
            data_processamento: &record.processed_at,
        }
    }
}

/// Path of the detailed file belonging to tabular output `output`.
///
/// The extension is swapped for `.json`; an output that is already `.json`
/// gets `.detailed.json` so the two files never collide.
pub fn detailed_path(output: &Path) -> PathBuf {
    let is_json = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        output.with_extension("detailed.json")
    } else {
        output.with_extension("json")
    }
}

/// Write both artifacts for `records`.
///
/// Failures are logged per artifact and never returned: one artifact
/// failing does not stop the other from being written.
pub fn write_results(records: &[InvoiceRecord], output: &Path) -> WriteReport {
    let mut report = WriteReport::default();

    match write_tabular(records, output) {
        Ok(()) => {
            info!("Data saved to: {}", output.display());
            report.tabular = Some(output.to_path_buf());
        }
        Err(e) => error!("Failed to write tabular output {}: {}", output.display(), e),
    }

    let detailed = detailed_path(output);
    match write_detailed(records, &detailed) {
        Ok(()) => {
            info!("Detailed data saved to: {}", detailed.display());
            report.detailed = Some(detailed);
        }
        Err(e) => error!("Failed to write detailed output {}: {}", detailed.display(), e),
    }

    report
}

/// Write one row per record. `.tsv` paths are tab-separated, anything else CSV.
pub fn write_tabular(records: &[InvoiceRecord], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;

    let is_tsv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    let delimiter = if is_tsv { b'\t' } else { b',' };

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(TABULAR_COLUMNS)?;
    for record in records {
        wtr.serialize(InvoiceRow::from(record))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write all records, items included, as one pretty-printed JSON array.
///
/// Non-ASCII text is written as-is, indented by two spaces.
pub fn write_detailed(records: &[InvoiceRecord], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::LineItem;
    use pretty_assertions::assert_eq;

    fn sample(n: u32) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: n.to_string(),
            issue_date: "15/01/2024".to_string(),
            issuer_tax_id: "12.345.678/0001-90".to_string(),
            issuer_name: "Distribuidora São João Ltda".to_string(),
            total_value: "1.234,56".to_string(),
            items: vec![LineItem {
                description: "Açúcar cristal 5kg".to_string(),
                quantity: "10".to_string(),
                unit_value: "23,45".to_string(),
                total_value: "234,50".to_string(),
            }],
            source_file: format!("nf_{}.pdf", n),
            processed_at: "2024-01-20T10:00:00.000000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detailed_path() {
        assert_eq!(detailed_path(Path::new("out/res.csv")), PathBuf::from("out/res.json"));
        assert_eq!(detailed_path(Path::new("res.xlsx")), PathBuf::from("res.json"));
        assert_eq!(detailed_path(Path::new("res")), PathBuf::from("res.json"));
        assert_eq!(detailed_path(Path::new("res.JSON")), PathBuf::from("res.detailed.json"));
    }

    #[test]
    fn test_tabular_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("res.csv");
        write_tabular(&[sample(1), sample(2)], &path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, TABULAR_COLUMNS.to_vec());

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "nf_1.pdf");
        assert_eq!(&rows[1][1], "2");
        assert_eq!(&rows[0][7], "1.234,56");
        assert_eq!(&rows[0][8], "");
        assert_eq!(rows[0].len(), 11);
    }

    #[test]
    fn test_tsv_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("res.tsv");
        write_tabular(&[sample(1)], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("arquivo_origem\tnumero_nf\t"));
    }

    #[test]
    fn test_detailed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("res.json");
        let records = vec![sample(1), sample(2)];
        write_detailed(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Distribuidora São João Ltda"));
        assert!(content.contains("Açúcar cristal 5kg"));
        assert!(content.starts_with("[\n  {\n    \"numero_nf\""));

        let parsed: Vec<InvoiceRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_partial_failure_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the tabular file should go
        let output = dir.path().join("res.csv");
        fs::create_dir(&output).unwrap();

        let report = write_results(&[sample(1)], &output);

        assert_eq!(report.tabular, None);
        assert_eq!(report.detailed, Some(dir.path().join("res.json")));
        assert!(!report.is_complete());
        assert!(dir.path().join("res.json").is_file());
    }

    #[test]
    fn test_write_results_complete() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("res.csv");

        let report = write_results(&[sample(3)], &output);
        assert!(report.is_complete());
        assert!(output.is_file());
    }
}

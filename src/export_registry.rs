use std::{collections::HashMap, fmt::Display, path::Path, sync::Arc};

use clap::ValueEnum;
use thiserror::Error;

use spendlog_core::ExpenseRecord;

use crate::exporters::{CsvExporter, PdfExporter, XlsxExporter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("document error: {0}")]
    Document(String),
    #[error("no exporter registered for {0}")]
    UnsupportedFormat(ExportFormat),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated text
    #[value(name = "csv")]
    Csv,
    /// Excel workbook
    #[value(name = "xlsx", alias = "excel")]
    Spreadsheet,
    /// Paginated PDF document
    #[value(name = "pdf")]
    Document,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel",
            ExportFormat::Document => "PDF",
        })
    }
}

/// Writes the expense log to a file in one format.
pub trait Exporter: Send + Sync {
    fn export(&self, records: &[ExpenseRecord], destination: &Path) -> Result<(), ExportError>;
}

pub struct ExporterRegistry {
    exporters: HashMap<ExportFormat, Arc<dyn Exporter>>,
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterRegistry {
    pub fn new() -> ExporterRegistry {
        ExporterRegistry {
            exporters: HashMap::new(),
        }
    }

    /// Registry with the CSV, spreadsheet and PDF writers.
    pub fn with_defaults() -> ExporterRegistry {
        let mut registry = ExporterRegistry::new();
        registry.register_exporter(ExportFormat::Csv, Arc::new(CsvExporter));
        registry.register_exporter(ExportFormat::Spreadsheet, Arc::new(XlsxExporter));
        registry.register_exporter(ExportFormat::Document, Arc::new(PdfExporter::default()));
        registry
    }

    pub fn register_exporter(&mut self, format: ExportFormat, exporter: Arc<dyn Exporter>) {
        self.exporters.insert(format, exporter);
    }

    pub fn get_exporter(&self, format: ExportFormat) -> Option<Arc<dyn Exporter>> {
        self.exporters.get(&format).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_format() {
        let registry = ExporterRegistry::with_defaults();
        for format in ExportFormat::value_variants() {
            assert!(registry.get_exporter(*format).is_some(), "missing {}", format);
        }
        assert!(ExporterRegistry::new().get_exporter(ExportFormat::Csv).is_none());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::from_str("xlsx", true).unwrap(), ExportFormat::Spreadsheet);
        assert_eq!(ExportFormat::from_str("excel", true).unwrap(), ExportFormat::Spreadsheet);
        assert_eq!(ExportFormat::from_str("PDF", true).unwrap(), ExportFormat::Document);
        assert_eq!(ExportFormat::Document.extension(), "pdf");
        assert_eq!(ExportFormat::Csv.to_string(), "CSV");
    }
}

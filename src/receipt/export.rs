use std::{
    fmt,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    errors::{BudgetError, Result},
    utils::{ensure_dir, write_atomic},
};

use super::{printable_document, render_html, render_text, Receipt, ReceiptStyle};

const FILE_PREFIX: &str = "receipt";
const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_SUFFIX: u32 = 999;

/// File formats a receipt can be exported to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Html => "html",
        }
    }

    pub fn render(self, receipt: &Receipt, style: &ReceiptStyle) -> String {
        match self {
            ExportFormat::Text => render_text(receipt, style),
            ExportFormat::Html => render_html(receipt, style),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => Err(BudgetError::invalid(format!(
                "unknown export format `{other}` (expected text or html)"
            ))),
        }
    }
}

/// Destination for finished receipts.
pub trait ReceiptSink {
    /// Writes the receipt in `format` and returns where it went.
    fn export(&self, receipt: &Receipt, format: ExportFormat) -> Result<PathBuf>;

    /// Writes a self-printing document for the receipt.
    fn print(&self, receipt: &Receipt) -> Result<PathBuf>;
}

/// Writes receipts as date-named files inside a directory.
#[derive(Debug, Clone)]
pub struct ReceiptExporter {
    dir: PathBuf,
    style: ReceiptStyle,
}

impl ReceiptExporter {
    pub fn new(dir: impl Into<PathBuf>, style: ReceiptStyle) -> Self {
        Self {
            dir: dir.into(),
            style,
        }
    }

    fn stem_for(receipt: &Receipt, label: Option<&str>) -> String {
        let date = receipt.issued_at.format(DATE_FORMAT);
        match label {
            Some(label) => format!("{FILE_PREFIX}_{date}_{label}"),
            None => format!("{FILE_PREFIX}_{date}"),
        }
    }

    /// First free `<stem>.<ext>`, then `<stem>_2.<ext>` and so on.
    fn unique_path(&self, stem: &str, extension: &str) -> Result<PathBuf> {
        let first = self.dir.join(format!("{stem}.{extension}"));
        if !first.exists() {
            return Ok(first);
        }
        (2..=MAX_SUFFIX)
            .map(|n| self.dir.join(format!("{stem}_{n}.{extension}")))
            .find(|candidate| !candidate.exists())
            .ok_or_else(|| {
                BudgetError::ExportFailure(format!("too many receipts named `{stem}`"))
            })
    }

    fn write(&self, stem: &str, extension: &str, contents: &str) -> Result<PathBuf> {
        let outcome = ensure_dir(&self.dir)
            .and_then(|_| self.unique_path(stem, extension))
            .and_then(|path| write_atomic(&path, contents).map(|_| path));
        match outcome {
            Ok(path) => {
                info!(path = %path.display(), "receipt written");
                Ok(path)
            }
            Err(BudgetError::ExportFailure(message)) => Err(BudgetError::ExportFailure(message)),
            Err(err) => {
                warn!(error = %err, dir = %self.dir.display(), "receipt export failed");
                Err(BudgetError::ExportFailure(err.to_string()))
            }
        }
    }
}

impl ReceiptSink for ReceiptExporter {
    fn export(&self, receipt: &Receipt, format: ExportFormat) -> Result<PathBuf> {
        let contents = format.render(receipt, &self.style);
        self.write(&Self::stem_for(receipt, None), format.extension(), &contents)
    }

    fn print(&self, receipt: &Receipt) -> Result<PathBuf> {
        let contents = printable_document(receipt, &self.style);
        self.write(&Self::stem_for(receipt, Some("print")), "html", &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AcceptOverage, Ledger};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_receipt() -> Receipt {
        let mut ledger = Ledger::with_budget(20.0).unwrap();
        ledger.add_item("Bread", 3.25, &mut AcceptOverage).unwrap();
        let issued = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        Receipt::from_ledger(&ledger, issued)
    }

    #[test]
    fn export_names_files_by_date_and_avoids_clobbering() {
        let temp = TempDir::new().unwrap();
        let exporter = ReceiptExporter::new(temp.path().join("out"), ReceiptStyle::default());
        let receipt = sample_receipt();

        let first = exporter.export(&receipt, ExportFormat::Text).unwrap();
        let second = exporter.export(&receipt, ExportFormat::Text).unwrap();
        let html = exporter.export(&receipt, ExportFormat::Html).unwrap();

        assert_eq!(first.file_name().unwrap(), "receipt_2025-06-02.txt");
        assert_eq!(second.file_name().unwrap(), "receipt_2025-06-02_2.txt");
        assert_eq!(html.file_name().unwrap(), "receipt_2025-06-02.html");
        let text = std::fs::read_to_string(first).unwrap();
        assert!(text.contains("3.25 SAR"));
    }

    #[test]
    fn print_writes_self_printing_page() {
        let temp = TempDir::new().unwrap();
        let exporter = ReceiptExporter::new(temp.path(), ReceiptStyle::default());
        let path = exporter.print(&sample_receipt()).unwrap();
        assert_eq!(path.file_name().unwrap(), "receipt_2025-06-02_print.html");
        let page = std::fs::read_to_string(path).unwrap();
        assert!(page.contains("window.print()"));
    }

    #[test]
    fn unwritable_directory_reports_export_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, "occupied").unwrap();
        let exporter = ReceiptExporter::new(&blocker, ReceiptStyle::default());
        let err = exporter
            .export(&sample_receipt(), ExportFormat::Html)
            .expect_err("export into a file path must fail");
        assert!(matches!(err, BudgetError::ExportFailure(_)));
    }

    #[test]
    fn formats_parse_from_user_text() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("png".parse::<ExportFormat>().is_err());
    }
}

//! Export of the current measurement
//!
//! The session packages what is on screen as an [`ExportSnapshot`] and hands
//! it to an [`ExportSink`] together with the requested [`ExportFormat`].
//! Rendering images, PDFs and blueprints is left to the host; the crate
//! writes the CSV row itself.

use crate::derive::DerivedMeasurement;
use crate::mode::Mode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Error types for export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("export format not supported by this sink: {0:?}")]
    Unsupported(ExportFormat),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output format requested from the export menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Image,
    Pdf,
    Csv,
    Blueprint,
}

/// Columns of the CSV snapshot row
pub const CSV_HEADERS: [&str; 5] = ["Date", "Mode", "Width", "Height", "Extra"];

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

/// Everything an exporter needs to reproduce the current measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub mode: Mode,
    pub derived: DerivedMeasurement,
    pub label: String,
    pub project_id: Option<String>,
    pub taken_at: DateTime<Utc>,
}

impl ExportSnapshot {
    /// Write the snapshot as a single CSV row
    ///
    /// Columns: `Date,Mode,Width,Height,Extra` where the dimensions are the
    /// primary, secondary and extra display lines.
    pub fn write_csv<W: Write>(&self, writer: W, config: &CsvExportConfig) -> ExportResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(config.delimiter)
            .from_writer(writer);

        if config.include_headers {
            csv_writer.write_record(CSV_HEADERS)?;
        }

        csv_writer.write_record([
            self.taken_at.to_rfc3339_opts(SecondsFormat::Secs, true).as_str(),
            self.mode.id(),
            self.derived.primary.as_str(),
            self.derived.secondary.as_str(),
            self.derived.extra.as_str(),
        ])?;
        csv_writer.flush()?;
        Ok(())
    }

    /// Render the snapshot as CSV text with headers
    pub fn to_csv_string(&self) -> ExportResult<String> {
        let mut output = Vec::new();
        self.write_csv(&mut output, &CsvExportConfig::default())?;
        Ok(String::from_utf8(output)?)
    }
}

/// Export collaborator
pub trait ExportSink: Send {
    fn export(&mut self, format: ExportFormat, snapshot: &ExportSnapshot) -> ExportResult<()>;
}

/// Sink that writes CSV rows to any writer and rejects other formats
#[derive(Debug)]
pub struct CsvSink<W> {
    writer: W,
    config: CsvExportConfig,
    rows: usize,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, CsvExportConfig::default())
    }

    pub fn with_config(writer: W, config: CsvExportConfig) -> Self {
        Self {
            writer,
            config,
            rows: 0,
        }
    }

    /// Number of rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ExportSink for CsvSink<W> {
    fn export(&mut self, format: ExportFormat, snapshot: &ExportSnapshot) -> ExportResult<()> {
        if format != ExportFormat::Csv {
            return Err(ExportError::Unsupported(format));
        }
        // Headers only ahead of the first row
        let config = CsvExportConfig {
            include_headers: self.config.include_headers && self.rows == 0,
            ..self.config.clone()
        };
        snapshot.write_csv(&mut self.writer, &config)?;
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> ExportSnapshot {
        ExportSnapshot {
            mode: Mode::Room,
            derived: DerivedMeasurement::new("3.50 m", "Ceiling: 2.4 m", "Floor Area: 12.25 m²"),
            label: "Package #1".to_string(),
            project_id: None,
            taken_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_csv_row() {
        let csv = snapshot().to_csv_string().unwrap();
        insta::assert_snapshot!(csv, @r"
        Date,Mode,Width,Height,Extra
        2024-05-01T12:30:00Z,room,3.50 m,Ceiling: 2.4 m,Floor Area: 12.25 m²
        ");
    }

    #[test]
    fn test_csv_without_headers() {
        let mut output = Vec::new();
        let config = CsvExportConfig {
            include_headers: false,
            delimiter: b';',
        };
        snapshot().write_csv(&mut output, &config).unwrap();
        let csv = String::from_utf8(output).unwrap();
        assert_eq!(
            csv,
            "2024-05-01T12:30:00Z;room;3.50 m;Ceiling: 2.4 m;Floor Area: 12.25 m²\n"
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut snap = snapshot();
        snap.derived.primary = "1,5 m".to_string();
        let csv = snap.to_csv_string().unwrap();
        assert!(csv.contains("\"1,5 m\""));
    }

    #[test]
    fn test_csv_sink() {
        let mut sink = CsvSink::new(Vec::new());
        sink.export(ExportFormat::Csv, &snapshot()).unwrap();
        sink.export(ExportFormat::Csv, &snapshot()).unwrap();
        assert!(matches!(
            sink.export(ExportFormat::Pdf, &snapshot()),
            Err(ExportError::Unsupported(ExportFormat::Pdf))
        ));
        assert_eq!(sink.rows(), 2);

        let csv = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert_eq!(csv.matches("Date,Mode").count(), 1);
    }
}

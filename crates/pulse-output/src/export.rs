//! Export of the final table and its summary.
//!
//! Tables are written with the polars CSV writer; summaries go through the
//! [`Exporter`] trait as CSV or JSON.

use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use crate::Result;
use crate::summary::DatasetSummary;

/// Rows in the sample file
pub const SAMPLE_ROWS: usize = 100;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        create_parent(path)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// One `metric,value` line of the CSV summary
#[derive(Debug, Serialize)]
struct SummaryRecord {
    metric: String,
    value: String,
}

impl DatasetSummary {
    fn to_records(&self) -> Vec<SummaryRecord> {
        let record = |metric: String, value: String| SummaryRecord { metric, value };
        let mut records = vec![
            record("rows".into(), self.rows.to_string()),
            record("columns".into(), self.columns.to_string()),
            record(
                "start_date".into(),
                self.start_date.map(|d| d.to_string()).unwrap_or_default(),
            ),
            record(
                "end_date".into(),
                self.end_date.map(|d| d.to_string()).unwrap_or_default(),
            ),
        ];
        for class in &self.classes {
            records.push(record(
                format!("{}_assets", class.asset_type),
                class.assets.to_string(),
            ));
            records.push(record(
                format!("{}_rows", class.asset_type),
                class.rows.to_string(),
            ));
        }
        for (category, count) in &self.feature_counts {
            records.push(record(format!("features_{category}"), count.to_string()));
        }
        for target in &self.targets {
            records.push(record(
                format!("{}_positive_rate", target.column),
                format!("{:.4}", target.positive_rate()),
            ));
        }
        records.push(record(
            "missing_values".into(),
            self.missing_values.to_string(),
        ));
        records
    }
}

impl Exporter for DatasetSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self.to_records() {
                    wtr.serialize(&record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `table` as CSV with a header row, creating parent directories
pub fn write_table(table: &mut DataFrame, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(table)?;
    info!(path = %path.display(), rows = table.height(), "wrote table");
    Ok(())
}

/// Write the first [`SAMPLE_ROWS`] rows of `table`
pub fn write_sample(table: &DataFrame, path: &Path) -> Result<()> {
    let mut sample = table.head(Some(SAMPLE_ROWS));
    write_table(&mut sample, path)
}

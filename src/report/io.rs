use std::{
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
};

use polars::{
    frame::DataFrame,
    prelude::{CsvWriter, SchemaRef, SerWriter},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{DataError, IoError, TradesheetResult},
    report::polars_ext::DataFrameExt,
};

// ================================================================================================
// Traits
// ================================================================================================

/// Defines a common interface for all report types (rankings, enriched trades, ...).
pub trait Report {
    /// Access the underlying DataFrame.
    fn as_df(&self) -> &DataFrame;

    /// Number of rows in the report.
    fn len(&self) -> usize {
        self.as_df().height()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait ReportName {
    fn base_name(&self) -> String;

    fn filename(&self, format: ReportFormat) -> String {
        format!("{}.{}", self.base_name(), format)
    }
}

pub trait ToSchema {
    /// Returns the canonical schema for this table type.
    fn to_schema() -> SchemaRef;
}

pub trait ToJson {
    /// Serializes the report to a generic JSON Value.
    /// Returns a `Value::Array` containing row objects.
    fn to_json(&self) -> TradesheetResult<Value>;
}

pub trait ToCsv {
    /// Writes the report as `<dir>/<base_name>.csv` with a header row.
    ///
    /// Creates `dir` if it doesn't exist and overwrites an existing file.
    fn to_csv(&self, dir: impl AsRef<Path>) -> TradesheetResult<PathBuf>;
}

pub trait ToFile {
    /// Writes the report into `dir` using the given format and returns the written path.
    fn write_to(&self, dir: impl AsRef<Path>, format: ReportFormat) -> TradesheetResult<PathBuf>;
}

// ================================================================================================
// Blanket Implementations
// ================================================================================================

impl<T> ToJson for T
where
    T: Report,
{
    fn to_json(&self) -> TradesheetResult<Value> {
        let rows = self.as_df().to_json_rows()?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

impl<T> ToCsv for T
where
    T: Report + ReportName,
{
    fn to_csv(&self, dir: impl AsRef<Path>) -> TradesheetResult<PathBuf> {
        let file_path = prepare_target(dir.as_ref(), &self.filename(ReportFormat::Csv))?;

        let file = fs::File::create(&file_path).map_err(|e| {
            IoError::WriteFailed(format!("Failed to create {}: {e}", file_path.display()))
        })?;

        let mut df = self.as_df().clone();
        CsvWriter::new(BufWriter::new(file))
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| {
                DataError::DataFrame(format!(
                    "Failed to write CSV to '{}': {e}",
                    file_path.display()
                ))
            })?;

        Ok(file_path)
    }
}

impl<T> ToFile for T
where
    T: Report + ReportName,
{
    fn write_to(&self, dir: impl AsRef<Path>, format: ReportFormat) -> TradesheetResult<PathBuf> {
        match format {
            ReportFormat::Csv => self.to_csv(dir),
            ReportFormat::Json => {
                let file_path = prepare_target(dir.as_ref(), &self.filename(format))?;
                let file = fs::File::create(&file_path).map_err(|e| {
                    IoError::WriteFailed(format!("Failed to create {}: {e}", file_path.display()))
                })?;
                serde_json::to_writer_pretty(BufWriter::new(file), &self.to_json()?)
                    .map_err(IoError::Json)?;
                Ok(file_path)
            }
        }
    }
}

fn prepare_target(dir: &Path, file_name: &str) -> TradesheetResult<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            IoError::FileSystem(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }
    Ok(dir.join(file_name))
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
    Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

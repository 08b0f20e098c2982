//! Error types for the KPI pipeline
//!
//! Every error here is fatal: the run either writes all three result
//! sheets or nothing. Messages carry the offending directory, sheet,
//! column, and row so failures can be traced back to the source workbook.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No file in the search directory matches the input naming pattern.
    #[error("no workbook named like '*Inventory Turnover*' (excluding 'DATA' files) in {}", .dir.display())]
    InputNotFound { dir: PathBuf },

    /// More than one file matches the input naming pattern.
    #[error("multiple candidate workbooks in {}: {}", .dir.display(), .candidates.join(", "))]
    AmbiguousInput {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("failed to scan {}: {source}", .dir.display())]
    ScanDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open workbook {}: {source}", .path.display())]
    OpenWorkbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// A required sheet or column is missing, or a cell failed coercion.
    #[error("sheet '{sheet}': {detail}")]
    Load { sheet: String, detail: String },

    #[error("failed to write workbook {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

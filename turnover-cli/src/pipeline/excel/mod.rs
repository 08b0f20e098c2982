//! Workbook discovery, reading, and writing

pub mod discover;
pub mod reader;
pub mod writer;

pub use discover::find_workbook;
pub use reader::KpiWorkbook;
pub use writer::{cleaned_output_path, write_kpi_workbook};

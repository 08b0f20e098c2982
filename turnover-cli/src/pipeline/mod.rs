//! Monthly inventory turnover KPI pipeline
//!
//! Composes workbook discovery, the four sheet loaders, part derivation,
//! and KPI aggregation into one synchronous batch run: the run either
//! writes all three result sheets or fails with the first error.

pub mod aggregate;
pub mod error;
pub mod excel;
pub mod parts;
pub mod reclass;
pub mod types;

pub use aggregate::build_kpi_tables;
pub use error::PipelineError;
pub use parts::derive_parts;
pub use reclass::{Classified, reclassify};
pub use types::*;

use std::path::PathBuf;

use excel::reader::KpiWorkbook;
use excel::{discover, writer};

/// Where to look for the input workbook. Threaded explicitly instead of
/// reading the process working directory deep in the loaders.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub directory: PathBuf,
}

/// File paths and row counts from a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub part_rows: usize,
    pub class_rows: usize,
    pub group_rows: usize,
}

/// Run the full pipeline against the workbook found in `options.directory`.
pub fn run(options: &RunOptions) -> Result<RunReport, PipelineError> {
    let input = discover::find_workbook(&options.directory)?;
    log::info!("input workbook: {}", input.display());

    let mut workbook = KpiWorkbook::open(&input)?;
    let months = workbook.load_months()?;
    let part_classes = workbook.load_part_classes()?;
    let transactions = workbook.load_transactions()?;
    let inventory = workbook.load_inventory()?;
    log::info!(
        "loaded {} months, {} part classes, {} transactions, {} inventory snapshots",
        months.len(),
        part_classes.len(),
        transactions.len(),
        inventory.len()
    );

    let parts = derive_parts(&transactions, &inventory);
    log::debug!("derived {} distinct parts", parts.len());

    let tables = build_kpi_tables(&months, &part_classes, &parts, &transactions, &inventory);

    let output = writer::cleaned_output_path(&input);
    writer::write_kpi_workbook(&output, &tables)?;
    log::info!("wrote {}", output.display());

    Ok(RunReport {
        input,
        output,
        part_rows: tables.parts.len(),
        class_rows: tables.classes.len(),
        group_rows: tables.groups.len(),
    })
}

//! Command-line interface for the turnover KPI pipeline

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use crate::pipeline::{self, RunOptions};

#[derive(Debug, Parser)]
#[command(
    name = "turnover-cli",
    version,
    about = "Builds monthly inventory turnover KPI tables from an ERP workbook export"
)]
pub struct Cli {
    /// Directory searched for the input workbook
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Suppress the per-table summary
    #[arg(long)]
    pub quiet: bool,
}

/// Run the pipeline and print a short summary of what was written.
pub fn run(args: Cli) -> Result<()> {
    let options = RunOptions {
        directory: args.dir.clone(),
    };

    let report = pipeline::run(&options)
        .with_context(|| format!("KPI pipeline failed for {}", args.dir.display()))?;

    if !args.quiet {
        println!("{}  {}", "Input:".dimmed(), report.input.display());
        println!(
            "{} {}",
            "Output:".dimmed(),
            report.output.display().to_string().cyan()
        );
        println!(
            "  KPI_Parts:   {} rows",
            report.part_rows.to_string().bright_green()
        );
        println!(
            "  KPI_Classes: {} rows",
            report.class_rows.to_string().bright_green()
        );
        println!(
            "  KPI_Groups:  {} rows",
            report.group_rows.to_string().bright_green()
        );
    }

    Ok(())
}

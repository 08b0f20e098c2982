//! Read the source sheets from the input workbook
//!
//! One calamine handle is shared by all four loaders. Columns are resolved
//! by header name, cells are coerced to the typed records in
//! `pipeline::types`, and coercion failures surface as Load errors naming
//! the sheet, row, and column.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;

use crate::pipeline::error::PipelineError;
use crate::pipeline::reclass::reclassify;
use crate::pipeline::types::{InventorySnapshot, Month, PartClass, Transaction};

/// Required sheet names in the input workbook.
mod sheets {
    pub const DATES: &str = "DATES";
    pub const PART_CLASSES: &str = "Part Classes";
    pub const TRANSACTIONS: &str = "ALL Transactions";
    pub const INVENTORY: &str = "On-Hand Inventory";
}

static EMPTY_CELL: Data = Data::Empty;

/// The input workbook, opened once and read sheet by sheet.
pub struct KpiWorkbook {
    workbook: Xlsx<BufReader<File>>,
}

impl KpiWorkbook {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let workbook: Xlsx<_> =
            open_workbook(path).map_err(|source| PipelineError::OpenWorkbook {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { workbook })
    }

    /// Load the KPI reporting calendar from the "DATES" sheet.
    ///
    /// Rows whose month cell is empty or unparseable are dropped (the
    /// calendar sheet is padded with blanks well past the last real month);
    /// the survivors are sorted ascending.
    pub fn load_months(&mut self) -> Result<Vec<Month>, PipelineError> {
        let sheet = sheets::DATES;
        let (headers, rows) = self.sheet_rows(sheet)?;
        let month_col = column_index(sheet, &headers, "KPI Month")?;
        let active_col = column_index(sheet, &headers, "Active?")?;

        let mut months = Vec::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let month_cell = cell(row, month_col);
            let Some(month) = cell_date(month_cell) else {
                if !is_blank(month_cell) {
                    log::warn!(
                        "{sheet} row {}: unparseable KPI Month, row dropped",
                        row_idx + 2
                    );
                }
                continue;
            };
            months.push(Month {
                month,
                active: cell_bool(cell(row, active_col)).unwrap_or(false),
            });
        }

        months.sort_by_key(|m| m.month);
        log::debug!("{sheet}: {} months", months.len());
        Ok(months)
    }

    /// Load the part class taxonomy, sorted by class id.
    pub fn load_part_classes(&mut self) -> Result<Vec<PartClass>, PipelineError> {
        let sheet = sheets::PART_CLASSES;
        let (headers, rows) = self.sheet_rows(sheet)?;
        let class_col = column_index(sheet, &headers, "ClassID")?;
        let group_col = column_index(sheet, &headers, "Class Group")?;
        let desc_col = column_index(sheet, &headers, "Description")?;

        let mut classes = Vec::new();
        for row in &rows {
            if [class_col, group_col, desc_col]
                .iter()
                .all(|&c| is_blank(cell(row, c)))
            {
                continue;
            }
            classes.push(PartClass {
                class_id: cell_string(cell(row, class_col)),
                class_group: cell_string(cell(row, group_col)),
                description: cell_string(cell(row, desc_col)),
            });
        }

        classes.sort_by(|a, b| a.class_id.cmp(&b.class_id));
        log::debug!("{sheet}: {} classes", classes.len());
        Ok(classes)
    }

    /// Load the received-goods transactions, reclassified.
    pub fn load_transactions(&mut self) -> Result<Vec<Transaction>, PipelineError> {
        let sheet = sheets::TRANSACTIONS;
        let (headers, rows) = self.sheet_rows(sheet)?;
        let month_col = column_index(sheet, &headers, "KPI Month")?;
        let part_col = column_index(sheet, &headers, "Part Number")?;
        let class_col = column_index(sheet, &headers, "ClassID")?;
        let qty_col = column_index(sheet, &headers, "UPDATED Quantity")?;
        let decimal_col = column_index(sheet, &headers, "Decimal?")?;

        let mut transactions = Vec::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = row_idx + 2;
            if [month_col, part_col, class_col, qty_col, decimal_col]
                .iter()
                .all(|&c| is_blank(cell(row, c)))
            {
                continue;
            }
            let month = cell_date(cell(row, month_col))
                .ok_or_else(|| load_error(sheet, row_num, "KPI Month", "expected a date"))?;
            let received_qty = cell_quantity(cell(row, qty_col)).ok_or_else(|| {
                load_error(sheet, row_num, "UPDATED Quantity", "expected a number")
            })?;
            transactions.push(Transaction {
                month,
                part_number: cell_string(cell(row, part_col)),
                class_id: cell_string(cell(row, class_col)),
                received_qty,
                decimal: cell_bool(cell(row, decimal_col)).unwrap_or(false),
            });
        }

        log::debug!("{sheet}: {} transactions", transactions.len());
        Ok(reclassify(transactions))
    }

    /// Load the on-hand inventory snapshots, reclassified.
    pub fn load_inventory(&mut self) -> Result<Vec<InventorySnapshot>, PipelineError> {
        let sheet = sheets::INVENTORY;
        let (headers, rows) = self.sheet_rows(sheet)?;
        let end_col = column_index(sheet, &headers, "END Month")?;
        let start_col = column_index(sheet, &headers, "START Month")?;
        let part_col = column_index(sheet, &headers, "Part")?;
        let class_col = column_index(sheet, &headers, "ClassID")?;
        let qty_col = column_index(sheet, &headers, "TotalOnHandQty")?;
        let decimal_col = column_index(sheet, &headers, "Decimal?")?;

        let mut snapshots = Vec::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = row_idx + 2;
            if [end_col, start_col, part_col, class_col, qty_col, decimal_col]
                .iter()
                .all(|&c| is_blank(cell(row, c)))
            {
                continue;
            }
            let start_month = cell_date(cell(row, start_col))
                .ok_or_else(|| load_error(sheet, row_num, "START Month", "expected a date"))?;
            let end_month = cell_date(cell(row, end_col))
                .ok_or_else(|| load_error(sheet, row_num, "END Month", "expected a date"))?;
            let quantity = cell_quantity(cell(row, qty_col)).ok_or_else(|| {
                load_error(sheet, row_num, "TotalOnHandQty", "expected a number")
            })?;
            snapshots.push(InventorySnapshot {
                start_month,
                end_month,
                part_number: cell_string(cell(row, part_col)),
                class_id: cell_string(cell(row, class_col)),
                quantity,
                decimal: cell_bool(cell(row, decimal_col)).unwrap_or(false),
            });
        }

        log::debug!("{sheet}: {} snapshots", snapshots.len());
        Ok(reclassify(snapshots))
    }

    /// Read a sheet into a header row and data rows.
    fn sheet_rows(&mut self, sheet: &str) -> Result<(Vec<String>, Vec<Vec<Data>>), PipelineError> {
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| PipelineError::Load {
                sheet: sheet.to_string(),
                detail: format!("cannot read sheet: {e}"),
            })?;

        let mut rows = range.rows().map(|r| r.to_vec());
        let headers: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(header_name).collect())
            .unwrap_or_default();
        Ok((headers, rows.collect()))
    }
}

fn column_index(sheet: &str, headers: &[String], name: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| PipelineError::Load {
            sheet: sheet.to_string(),
            detail: format!("missing required column '{name}'"),
        })
}

fn load_error(sheet: &str, row_num: usize, column: &str, detail: &str) -> PipelineError {
    PipelineError::Load {
        sheet: sheet.to_string(),
        detail: format!("row {row_num}, column '{column}': {detail}"),
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn cell<'a>(row: &'a [Data], col: usize) -> &'a Data {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) => parse_date_str(s),
        Data::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn cell_bool(cell: &Data) -> Option<bool> {
    match cell {
        Data::Bool(b) => Some(*b),
        Data::Int(i) => Some(*i != 0),
        Data::Float(f) => Some(*f != 0.0),
        Data::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a quantity cell. An empty cell reads as 0.0 so padded exports
/// load; anything else non-numeric is a coercion failure.
fn cell_quantity(cell: &Data) -> Option<f64> {
    if is_blank(cell) {
        return Some(0.0);
    }
    cell_f64(cell)
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // whole-number floats are part/class ids, not quantities
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

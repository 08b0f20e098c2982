//! Write the KPI result tables to a new workbook
//!
//! Column order and row order are exactly as produced by the aggregator.
//! Absent part numbers, UoMs, and quantities are left as empty cells.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::pipeline::error::PipelineError;
use crate::pipeline::types::{ClassKpiRow, GroupKpiRow, KpiTables, PartKpiRow};

pub const PARTS_SHEET: &str = "KPI_Parts";
pub const CLASSES_SHEET: &str = "KPI_Classes";
pub const GROUPS_SHEET: &str = "KPI_Groups";

const PART_HEADERS: [&str; 9] = [
    "KPI Month",
    "ClassID",
    "Class Group",
    "Description",
    "Part Number",
    "UoM",
    "Received.Quantity",
    "Start.Quantity",
    "End.Quantity",
];

const CLASS_HEADERS: [&str; 8] = [
    "KPI Month",
    "ClassID",
    "Class Group",
    "Description",
    "UoM",
    "Received.Quantity",
    "Start.Quantity",
    "End.Quantity",
];

const GROUP_HEADERS: [&str; 6] = [
    "KPI Month",
    "Class Group",
    "UoM",
    "Received.Quantity",
    "Start.Quantity",
    "End.Quantity",
];

/// Derive the output path from the input path by inserting " CLEANED DATA"
/// before the final five characters of the file name (the dot plus a
/// four-character extension).
pub fn cleaned_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut split = name.len().saturating_sub(5);
    while split > 0 && !name.is_char_boundary(split) {
        split -= 1;
    }
    let renamed = format!("{} CLEANED DATA{}", &name[..split], &name[split..]);
    input.with_file_name(renamed)
}

/// Write the three result tables to `path`. Save failures are reported to
/// the caller, not retried.
pub fn write_kpi_workbook(path: &Path, tables: &KpiTables) -> Result<(), PipelineError> {
    build_workbook(tables)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn build_workbook(tables: &KpiTables) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    write_parts_sheet(workbook.add_worksheet(), &tables.parts, &date_format)?;
    write_classes_sheet(workbook.add_worksheet(), &tables.classes, &date_format)?;
    write_groups_sheet(workbook.add_worksheet(), &tables.groups, &date_format)?;

    Ok(workbook)
}

fn write_parts_sheet(
    ws: &mut Worksheet,
    rows: &[PartKpiRow],
    date_format: &Format,
) -> Result<(), XlsxError> {
    ws.set_name(PARTS_SHEET)?;
    write_headers(ws, &PART_HEADERS)?;
    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write_datetime_with_format(row, 0, &r.month, date_format)?;
        ws.write_string(row, 1, &r.class_id)?;
        ws.write_string(row, 2, &r.class_group)?;
        ws.write_string(row, 3, &r.description)?;
        if let Some(part_number) = &r.part_number {
            ws.write_string(row, 4, part_number)?;
        }
        if let Some(uom) = r.uom {
            ws.write_string(row, 5, uom.as_str())?;
        }
        write_opt_number(ws, row, 6, r.received_qty)?;
        write_opt_number(ws, row, 7, r.start_qty)?;
        write_opt_number(ws, row, 8, r.end_qty)?;
    }
    Ok(())
}

fn write_classes_sheet(
    ws: &mut Worksheet,
    rows: &[ClassKpiRow],
    date_format: &Format,
) -> Result<(), XlsxError> {
    ws.set_name(CLASSES_SHEET)?;
    write_headers(ws, &CLASS_HEADERS)?;
    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write_datetime_with_format(row, 0, &r.month, date_format)?;
        ws.write_string(row, 1, &r.class_id)?;
        ws.write_string(row, 2, &r.class_group)?;
        ws.write_string(row, 3, &r.description)?;
        if let Some(uom) = r.uom {
            ws.write_string(row, 4, uom.as_str())?;
        }
        ws.write_number(row, 5, r.received_qty)?;
        ws.write_number(row, 6, r.start_qty)?;
        ws.write_number(row, 7, r.end_qty)?;
    }
    Ok(())
}

fn write_groups_sheet(
    ws: &mut Worksheet,
    rows: &[GroupKpiRow],
    date_format: &Format,
) -> Result<(), XlsxError> {
    ws.set_name(GROUPS_SHEET)?;
    write_headers(ws, &GROUP_HEADERS)?;
    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write_datetime_with_format(row, 0, &r.month, date_format)?;
        ws.write_string(row, 1, &r.class_group)?;
        if let Some(uom) = r.uom {
            ws.write_string(row, 2, uom.as_str())?;
        }
        ws.write_number(row, 3, r.received_qty)?;
        ws.write_number(row, 4, r.start_qty)?;
        ws.write_number(row, 5, r.end_qty)?;
    }
    Ok(())
}

fn write_headers(ws: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    for (col, name) in headers.iter().enumerate() {
        ws.write_string(0, col as u16, *name)?;
    }
    Ok(())
}

fn write_opt_number(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
) -> Result<(), XlsxError> {
    if let Some(value) = value {
        ws.write_number(row, col, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Uom;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use chrono::NaiveDate;

    fn date(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    fn sample_tables() -> KpiTables {
        KpiTables {
            parts: vec![
                PartKpiRow {
                    month: date(1),
                    class_id: "C1".to_string(),
                    class_group: "G1".to_string(),
                    description: "desc".to_string(),
                    part_number: Some("P1".to_string()),
                    uom: Some(Uom::Each),
                    received_qty: Some(10.0),
                    start_qty: Some(5.0),
                    end_qty: None,
                },
                PartKpiRow {
                    month: date(1),
                    class_id: "C2".to_string(),
                    class_group: "G1".to_string(),
                    description: "empty class".to_string(),
                    part_number: None,
                    uom: None,
                    received_qty: None,
                    start_qty: None,
                    end_qty: None,
                },
            ],
            classes: vec![ClassKpiRow {
                month: date(1),
                class_id: "C1".to_string(),
                class_group: "G1".to_string(),
                description: "desc".to_string(),
                uom: Some(Uom::Each),
                received_qty: 10.0,
                start_qty: 5.0,
                end_qty: 0.0,
            }],
            groups: vec![GroupKpiRow {
                month: date(1),
                class_group: "G1".to_string(),
                uom: Some(Uom::Each),
                received_qty: 10.0,
                start_qty: 5.0,
                end_qty: 0.0,
            }],
        }
    }

    #[test]
    fn test_cleaned_output_path_insertion() {
        let path = cleaned_output_path(Path::new("/data/Inventory Turnover Q1.xlsx"));
        assert_eq!(
            path,
            Path::new("/data/Inventory Turnover Q1 CLEANED DATA.xlsx")
        );
    }

    #[test]
    fn test_cleaned_output_path_keeps_directory() {
        let path = cleaned_output_path(Path::new("reports/Inventory Turnover.xlsx"));
        assert_eq!(
            path.parent().and_then(|p| p.to_str()),
            Some("reports")
        );
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        write_kpi_workbook(&path, &sample_tables()).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec![PARTS_SHEET, CLASSES_SHEET, GROUPS_SHEET]
        );

        let parts = workbook.worksheet_range(PARTS_SHEET).unwrap();
        let rows: Vec<Vec<Data>> = parts.rows().map(|r| r.to_vec()).collect();
        assert_eq!(rows.len(), 3);

        let headers: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(headers, PART_HEADERS.to_vec());

        // first data row: full part row, End.Quantity left empty
        assert!(matches!(rows[1][0], Data::DateTime(_)));
        assert_eq!(rows[1][1], Data::String("C1".to_string()));
        assert_eq!(rows[1][5], Data::String("Each".to_string()));
        assert_eq!(rows[1][6], Data::Float(10.0));
        assert_eq!(rows[1][8], Data::Empty);

        // placeholder row: no part, no uom, no quantities
        assert_eq!(rows[2][4], Data::Empty);
        assert_eq!(rows[2][5], Data::Empty);
        assert_eq!(rows[2][6], Data::Empty);

        let groups = workbook.worksheet_range(GROUPS_SHEET).unwrap();
        let rows: Vec<Vec<Data>> = groups.rows().map(|r| r.to_vec()).collect();
        let headers: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(headers, GROUP_HEADERS.to_vec());
        assert_eq!(rows[1][3], Data::Float(10.0));
        assert_eq!(rows[1][5], Data::Float(0.0));
    }
}

//! KPI result table records
//!
//! Quantity semantics differ by level. At part level a `None` quantity
//! means no fact row matched that (month, part) key. The class and group
//! rollups sum with absent values as zero, so any class or group that has
//! at least one constituent row reports 0.0 rather than nothing.

use chrono::NaiveDate;

use super::records::Uom;

/// One row of the part-level KPI table.
///
/// A class with no derived parts keeps a single row for each active month
/// with `part_number`, `uom`, and all quantities unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PartKpiRow {
    pub month: NaiveDate,
    pub class_id: String,
    pub class_group: String,
    pub description: String,
    pub part_number: Option<String>,
    pub uom: Option<Uom>,
    pub received_qty: Option<f64>,
    pub start_qty: Option<f64>,
    pub end_qty: Option<f64>,
}

/// One row of the class-level rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassKpiRow {
    pub month: NaiveDate,
    pub class_id: String,
    pub class_group: String,
    pub description: String,
    pub uom: Option<Uom>,
    pub received_qty: f64,
    pub start_qty: f64,
    pub end_qty: f64,
}

/// One row of the class-group-level rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupKpiRow {
    pub month: NaiveDate,
    pub class_group: String,
    pub uom: Option<Uom>,
    pub received_qty: f64,
    pub start_qty: f64,
    pub end_qty: f64,
}

/// The three result tables of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTables {
    pub parts: Vec<PartKpiRow>,
    pub classes: Vec<ClassKpiRow>,
    pub groups: Vec<GroupKpiRow>,
}

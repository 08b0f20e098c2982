//! Source and derived table records
//!
//! Each source sheet loads into a `Vec` of one of these structs. No
//! transformation mutates its input in place; every stage produces a new
//! vector.

use chrono::NaiveDate;

/// A calendar month from the KPI reporting calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct Month {
    pub month: NaiveDate,
    /// Whether this month is included in KPI reporting.
    pub active: bool,
}

/// A part classification category.
#[derive(Debug, Clone, PartialEq)]
pub struct PartClass {
    pub class_id: String,
    /// Coarser grouping of class ids.
    pub class_group: String,
    pub description: String,
}

/// One received-goods transaction record.
///
/// Multiple rows may share (month, part number); they are summed during
/// aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub month: NaiveDate,
    pub part_number: String,
    pub class_id: String,
    pub received_qty: f64,
    /// True when the source row carried a fractional quantity.
    pub decimal: bool,
}

/// One on-hand inventory snapshot spanning a month boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot {
    pub start_month: NaiveDate,
    pub end_month: NaiveDate,
    pub part_number: String,
    pub class_id: String,
    pub quantity: f64,
    pub decimal: bool,
}

/// Unit of measure derived from the quantities observed for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Uom {
    /// Only whole-count quantities observed.
    Each,
    /// At least one fractional quantity observed.
    Variable,
}

impl Uom {
    pub fn as_str(self) -> &'static str {
        match self {
            Uom::Each => "Each",
            Uom::Variable => "Variable",
        }
    }
}

impl std::fmt::Display for Uom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A distinct (part number, class id) pair observed across the fact tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub part_number: String,
    pub class_id: String,
    pub uom: Uom,
}

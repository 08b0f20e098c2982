//! KPI aggregation: scaffold expansion, fact attachment, and rollups
//!
//! The part-level table is built by expanding every active month against
//! every part class and every derived part of that class, then attaching
//! received/start/end quantities from keyed indexes over the fact tables.
//! The class and group tables sum the level below with absent quantities
//! as zero.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::types::{
    ClassKpiRow, GroupKpiRow, InventorySnapshot, KpiTables, Month, Part, PartClass, PartKpiRow,
    Transaction, Uom,
};

/// Build the three KPI result tables.
///
/// Inactive months are excluded up front. Parts whose class id does not
/// appear in `part_classes` never match a scaffold row and are dropped,
/// matching left-join semantics. An empty result at any level is valid.
pub fn build_kpi_tables(
    months: &[Month],
    part_classes: &[PartClass],
    parts: &[Part],
    transactions: &[Transaction],
    inventory: &[InventorySnapshot],
) -> KpiTables {
    let part_rows = build_part_rows(months, part_classes, parts, transactions, inventory);
    let class_rows = rollup_classes(&part_rows);
    let group_rows = rollup_groups(&class_rows);

    log::debug!(
        "aggregated {} part rows into {} class rows and {} group rows",
        part_rows.len(),
        class_rows.len(),
        group_rows.len()
    );

    KpiTables {
        parts: part_rows,
        classes: class_rows,
        groups: group_rows,
    }
}

fn build_part_rows(
    months: &[Month],
    part_classes: &[PartClass],
    parts: &[Part],
    transactions: &[Transaction],
    inventory: &[InventorySnapshot],
) -> Vec<PartKpiRow> {
    let mut parts_by_class: HashMap<&str, Vec<&Part>> = HashMap::new();
    for part in parts {
        parts_by_class
            .entry(part.class_id.as_str())
            .or_default()
            .push(part);
    }

    // Received quantities summed per (month, part number). Presence in the
    // map is what distinguishes "no transactions" from a zero total.
    let mut received: HashMap<(NaiveDate, &str), f64> = HashMap::new();
    for t in transactions {
        *received
            .entry((t.month, t.part_number.as_str()))
            .or_insert(0.0) += t.received_qty;
    }

    // Snapshot quantities keyed by the month each side of the boundary
    // falls in. Duplicate snapshots for the same key are summed so the
    // one-row-per-(month, part) invariant holds.
    let mut start_qty: HashMap<(NaiveDate, &str), f64> = HashMap::new();
    let mut end_qty: HashMap<(NaiveDate, &str), f64> = HashMap::new();
    for s in inventory {
        *start_qty
            .entry((s.start_month, s.part_number.as_str()))
            .or_insert(0.0) += s.quantity;
        *end_qty
            .entry((s.end_month, s.part_number.as_str()))
            .or_insert(0.0) += s.quantity;
    }

    let mut rows = Vec::new();
    for month in months.iter().filter(|m| m.active) {
        for class in part_classes {
            let Some(class_parts) = parts_by_class.get(class.class_id.as_str()) else {
                // class with no observed parts keeps its scaffold row
                rows.push(PartKpiRow {
                    month: month.month,
                    class_id: class.class_id.clone(),
                    class_group: class.class_group.clone(),
                    description: class.description.clone(),
                    part_number: None,
                    uom: None,
                    received_qty: None,
                    start_qty: None,
                    end_qty: None,
                });
                continue;
            };

            for part in class_parts {
                let key = (month.month, part.part_number.as_str());
                rows.push(PartKpiRow {
                    month: month.month,
                    class_id: class.class_id.clone(),
                    class_group: class.class_group.clone(),
                    description: class.description.clone(),
                    part_number: Some(part.part_number.clone()),
                    uom: Some(part.uom),
                    received_qty: received.get(&key).copied(),
                    start_qty: start_qty.get(&key).copied(),
                    end_qty: end_qty.get(&key).copied(),
                });
            }
        }
    }

    rows.sort_by(|a, b| {
        (a.month, &a.class_group, &a.class_id, &a.part_number).cmp(&(
            b.month,
            &b.class_group,
            &b.class_id,
            &b.part_number,
        ))
    });
    rows
}

/// Null-safe quantity accumulator: absent values contribute zero, so a
/// group whose rows carry no facts totals 0.0 rather than disappearing.
#[derive(Debug, Default, Clone, Copy)]
struct QtyTotals {
    received: f64,
    start: f64,
    end: f64,
}

impl QtyTotals {
    fn add(&mut self, received: Option<f64>, start: Option<f64>, end: Option<f64>) {
        self.received += received.unwrap_or(0.0);
        self.start += start.unwrap_or(0.0);
        self.end += end.unwrap_or(0.0);
    }
}

fn rollup_classes(part_rows: &[PartKpiRow]) -> Vec<ClassKpiRow> {
    // BTreeMap keyed in output order: (month, class group, class id), with
    // description and UoM as deterministic tiebreaks.
    type ClassKey = (NaiveDate, String, String, String, Option<Uom>);
    let mut groups: BTreeMap<ClassKey, QtyTotals> = BTreeMap::new();

    for row in part_rows {
        groups
            .entry((
                row.month,
                row.class_group.clone(),
                row.class_id.clone(),
                row.description.clone(),
                row.uom,
            ))
            .or_default()
            .add(row.received_qty, row.start_qty, row.end_qty);
    }

    groups
        .into_iter()
        .map(
            |((month, class_group, class_id, description, uom), totals)| ClassKpiRow {
                month,
                class_id,
                class_group,
                description,
                uom,
                received_qty: totals.received,
                start_qty: totals.start,
                end_qty: totals.end,
            },
        )
        .collect()
}

fn rollup_groups(class_rows: &[ClassKpiRow]) -> Vec<GroupKpiRow> {
    type GroupKey = (NaiveDate, String, Option<Uom>);
    let mut groups: BTreeMap<GroupKey, QtyTotals> = BTreeMap::new();

    for row in class_rows {
        groups
            .entry((row.month, row.class_group.clone(), row.uom))
            .or_default()
            .add(Some(row.received_qty), Some(row.start_qty), Some(row.end_qty));
    }

    groups
        .into_iter()
        .map(|((month, class_group, uom), totals)| GroupKpiRow {
            month,
            class_group,
            uom,
            received_qty: totals.received,
            start_qty: totals.start,
            end_qty: totals.end,
        })
        .collect()
}

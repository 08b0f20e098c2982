//! Derives the distinct part list from the fact tables

use std::collections::BTreeMap;

use super::types::{InventorySnapshot, Part, Transaction, Uom};

/// Build the distinct part list observed across transactions and inventory.
///
/// Groups the (part number, class id) projections of both fact tables and
/// ORs the fractional flag: a part becomes `Variable` as soon as any
/// contributing row carried a fractional quantity, otherwise `Each`. A part
/// number appearing under two class ids survives as two distinct rows.
/// Output is sorted by (class id, UoM, part number).
pub fn derive_parts(transactions: &[Transaction], inventory: &[InventorySnapshot]) -> Vec<Part> {
    let mut fractional: BTreeMap<(String, String), bool> = BTreeMap::new();

    for t in transactions {
        *fractional
            .entry((t.part_number.clone(), t.class_id.clone()))
            .or_insert(false) |= t.decimal;
    }
    for s in inventory {
        *fractional
            .entry((s.part_number.clone(), s.class_id.clone()))
            .or_insert(false) |= s.decimal;
    }

    let mut parts: Vec<Part> = fractional
        .into_iter()
        .map(|((part_number, class_id), decimal)| Part {
            part_number,
            class_id,
            uom: if decimal { Uom::Variable } else { Uom::Each },
        })
        .collect();

    parts.sort_by(|a, b| {
        (&a.class_id, a.uom, &a.part_number).cmp(&(&b.class_id, b.uom, &b.part_number))
    });
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    fn transaction(part_number: &str, class_id: &str, decimal: bool) -> Transaction {
        Transaction {
            month: month(1),
            part_number: part_number.to_string(),
            class_id: class_id.to_string(),
            received_qty: 1.0,
            decimal,
        }
    }

    fn snapshot(part_number: &str, class_id: &str, decimal: bool) -> InventorySnapshot {
        InventorySnapshot {
            start_month: month(1),
            end_month: month(2),
            part_number: part_number.to_string(),
            class_id: class_id.to_string(),
            quantity: 1.0,
            decimal,
        }
    }

    #[test]
    fn test_parts_deduplicated_across_sources() {
        let parts = derive_parts(
            &[transaction("P1", "C1", false), transaction("P1", "C1", false)],
            &[snapshot("P1", "C1", false)],
        );
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_number, "P1");
        assert_eq!(parts[0].uom, Uom::Each);
    }

    #[test]
    fn test_variable_uom_when_any_row_fractional() {
        let parts = derive_parts(
            &[transaction("P1", "C1", false)],
            &[snapshot("P1", "C1", true)],
        );
        assert_eq!(parts[0].uom, Uom::Variable);
    }

    #[test]
    fn test_each_uom_when_no_row_fractional() {
        let parts = derive_parts(&[transaction("P1", "C1", false)], &[]);
        assert_eq!(parts[0].uom, Uom::Each);
    }

    #[test]
    fn test_same_part_under_two_classes_kept_separate() {
        // reclassification can diverge between the two fact tables; both
        // pairs survive
        let parts = derive_parts(
            &[transaction("P1", "BEX", false)],
            &[snapshot("P1", "C1", false)],
        );
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_no_facts_no_parts() {
        assert!(derive_parts(&[], &[]).is_empty());
    }

    #[test]
    fn test_sorted_by_class_uom_part() {
        let parts = derive_parts(
            &[
                transaction("P2", "C2", false),
                transaction("P9", "C1", true),
                transaction("P1", "C1", false),
                transaction("P5", "C1", false),
            ],
            &[],
        );
        let order: Vec<(&str, &str, Uom)> = parts
            .iter()
            .map(|p| (p.class_id.as_str(), p.part_number.as_str(), p.uom))
            .collect();
        assert_eq!(
            order,
            vec![
                ("C1", "P1", Uom::Each),
                ("C1", "P5", Uom::Each),
                ("C1", "P9", Uom::Variable),
                ("C2", "P2", Uom::Each),
            ]
        );
    }
}

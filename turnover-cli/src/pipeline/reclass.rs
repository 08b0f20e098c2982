//! Raw bar reclassification of fact rows
//!
//! Some part numbers carry a raw bar marker ("BEX" or "BEP") while the
//! export assigns them a different class. Both fact loaders run this pass
//! before any join so the raw bar classes aggregate correctly.

use super::types::{InventorySnapshot, Transaction};

const RAW_BAR_EX: &str = "BEX";
const RAW_BAR_EP: &str = "BEP";

/// A fact row whose class can be reassigned from its part number.
pub trait Classified {
    fn part_number(&self) -> &str;
    fn set_class_id(&mut self, class_id: &str);
}

impl Classified for Transaction {
    fn part_number(&self) -> &str {
        &self.part_number
    }

    fn set_class_id(&mut self, class_id: &str) {
        self.class_id = class_id.to_string();
    }
}

impl Classified for InventorySnapshot {
    fn part_number(&self) -> &str {
        &self.part_number
    }

    fn set_class_id(&mut self, class_id: &str) {
        self.class_id = class_id.to_string();
    }
}

/// Force the class of raw bar part numbers.
///
/// Both markers are matched as literal, case-sensitive substrings of the
/// original part number. The BEP check runs second and overwrites, so a
/// part number carrying both markers ends up in "BEP". Never filters rows.
pub fn reclassify<T: Classified>(mut rows: Vec<T>) -> Vec<T> {
    for row in &mut rows {
        if let Some(class_id) = raw_bar_class(row.part_number()) {
            row.set_class_id(class_id);
        }
    }
    rows
}

fn raw_bar_class(part_number: &str) -> Option<&'static str> {
    let mut forced = None;
    if part_number.contains(RAW_BAR_EX) {
        forced = Some(RAW_BAR_EX);
    }
    if part_number.contains(RAW_BAR_EP) {
        forced = Some(RAW_BAR_EP);
    }
    forced
}

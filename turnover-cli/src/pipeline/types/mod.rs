//! Typed records for the source, derived, and result tables

mod records;
mod kpi;

pub use records::*;
pub use kpi::*;

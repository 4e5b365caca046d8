//! Readers for the binary files the solver writes.
//!
//! All files are little-endian and double precision. Time steps and stress
//! periods are one-based on disk and zero-based through this API.

mod binary;
mod budget;
mod error;
mod grb;
mod head;

pub use budget::{BudgetData, BudgetRecord, CellBudgetFile, ListEntry};
pub use error::{OutputError, OutputResult};
pub use grb::GridFile;
pub use head::{HeadFile, HeadRecordHeader};

#[cfg(test)]
pub(crate) use binary::fixture;
#[cfg(test)]
pub(crate) use grb::tests::strip_grb;

/// Zero-based (time step, stress period).
pub type KstpKper = (usize, usize);

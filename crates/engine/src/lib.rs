//! `sheetcut-engine`: splits a multi-table purchase-order sheet into one
//! grid per table.
//!
//! Pure engine crate: works on an in-memory [`Grid`] and returns new grids.
//! No file IO.

pub mod cell;
pub mod error;
pub mod footer;
pub mod grid;
pub mod header;
pub mod layout;
pub mod naming;
pub mod numbering;
pub mod options;
pub mod scan;
pub mod segment;
pub mod split;

#[cfg(test)]
pub mod harness;

pub use error::{SplitError, SplitWarning};
pub use grid::Grid;
pub use options::{ContinuationPolicy, SplitOptions};
pub use split::{split_grid, PlannedOutput, SplitPlan};

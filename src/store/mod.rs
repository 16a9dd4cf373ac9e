//! Store Module
//!
//! Lazily loaded, queryable postcode table.
//!
//! ## Responsibilities
//! - Load partition files on request, never implicitly
//! - Remember which partitions are resident (no eviction)
//! - Keep the derived postcode key in step with the table
//! - Answer normalised prefix queries in table order
//!
//! ## Lifecycle
//! ```text
//!   Empty ──load(keys)──▶ Loaded{k1} ──load(keys)──▶ Loaded{k1, k2, ...}
//!                           │                           │
//!                        query()                     query()
//! ```
//! Loads only ever add keys and rows. A missing partition file leaves the
//! key unloaded so a later load probes it again; a corrupt one is reported
//! and also leaves the key unloaded.

mod lazy;
mod report;
mod table;

pub use lazy::PostcodeStore;
pub use report::{LoadReport, PartitionOutcome};

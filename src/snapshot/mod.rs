//! Snapshot persistence module
//!
//! Phase one writes raw HTML snapshots and the provenance log here; phase two
//! reads them back. The directory layout is the only coupling between phases.

pub mod provenance;
pub mod store;

pub use provenance::{Provenance, PROVENANCE_FILE};
pub use store::{identifier_for, SnapshotStore, HTML_DIR};

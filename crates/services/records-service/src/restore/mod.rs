//! Backup ingestion: raw documents, field coercion and reconciliation.

pub mod coerce;
mod raw;
mod reconcile;
pub mod records;

pub use raw::{RawDocument, REQUIRED_COLLECTIONS};
pub use reconcile::{reconcile, RestoreReport};

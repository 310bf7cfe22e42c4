//! Infrastructure layer - document ownership and persistence wiring.

mod store;

pub use store::DocumentStore;

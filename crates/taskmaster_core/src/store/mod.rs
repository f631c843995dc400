//! In-memory entity stores.
//!
//! # Responsibility
//! - Hold one ordered collection per entity kind.
//! - Expose read-only snapshots to observers.
//!
//! # Invariants
//! - Stores never validate and never fail.
//! - Only the owning mutator writes to a shared store.

pub mod entity_store;
mod handle;

pub use entity_store::EntityStore;
pub use handle::StoreReader;

pub(crate) use handle::{StoreHandle, Ticket};

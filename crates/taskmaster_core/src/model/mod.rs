//! Domain model for optimistically managed collections.
//!
//! # Responsibility
//! - Define entity identity and the speculative marker contract.
//! - Define the TaskMaster task and project records.
//!
//! # Invariants
//! - At most one entity per id is visible in a collection.
//! - The speculative marker never leaves the process.

pub mod entity;
pub mod project;
pub mod task;

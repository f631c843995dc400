//! Core state logic for TaskMaster.
//! This crate owns optimistic mutation, rollback and reconciliation of
//! client-side entity collections.

pub mod config;
pub mod logging;
pub mod model;
pub mod mutator;
pub mod remote;
pub mod service;
pub mod store;
pub mod validation;

pub use config::{ConfigError, MutatorConfig, RuntimeConfig, UpdateMode};
pub use logging::{init_logging, logging_status, LogLevel, LoggingConfig, LoggingError};
pub use model::entity::{Draft, Entity, EntityId, Patch, TEMPORARY_ID_PREFIX};
pub use model::project::{NewProject, Project, ProjectPatch, ProjectValidator};
pub use model::task::{NewTask, Task, TaskPatch, TaskStatus, TaskValidator};
pub use mutator::{MutationError, MutationKind, MutationPhase, MutationResult, OptimisticMutator};
pub use remote::in_memory::{InMemoryBackend, RemoteCall};
pub use remote::{RemoteError, RemoteErrorKind, RemoteResult, RemoteSource};
pub use service::project_service::{ProjectMutator, ProjectRemote, ProjectService};
pub use service::task_service::{TaskFilter, TaskMutator, TaskRemote, TaskService};
pub use store::{EntityStore, StoreReader};
pub use validation::{AcceptAll, ValidationErrors, ValidationIssue, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Entity identity and the speculative marker.
//!
//! # Responsibility
//! - Define the identifier shared by every collection managed in core.
//! - Define the contracts an entity kind must meet to be mutated optimistically.
//!
//! # Invariants
//! - Temporary ids live in a local namespace (`tmp-` prefix by default) that
//!   remote sources never assign.
//! - `is_speculative()` is `true` only for entities synthesized locally before
//!   their remote call settled.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Default namespace prefix for locally minted ids.
pub const TEMPORARY_ID_PREFIX: &str = "tmp-";

/// Stable identifier of one entity inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mints a fresh id in the local temporary namespace.
    ///
    /// Every call yields a new v4 UUID suffix, so ids minted concurrently are
    /// distinct.
    pub fn temporary(prefix: &str) -> Self {
        Self(format!("{prefix}{}", Uuid::new_v4()))
    }

    /// Returns whether this id belongs to the temporary namespace `prefix`.
    pub fn is_temporary_with(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.0.starts_with(prefix)
    }

    /// Shorthand for [`EntityId::is_temporary_with`] using the default prefix.
    pub fn is_temporary(&self) -> bool {
        self.is_temporary_with(TEMPORARY_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A record that can live in an [`EntityStore`](crate::store::EntityStore).
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &EntityId;

    /// Whether this record is a local, not yet confirmed projection.
    fn is_speculative(&self) -> bool;

    fn set_speculative(&mut self, speculative: bool);
}

/// Create input that can be projected into a speculative entity.
pub trait Draft<E: Entity>: Send + Sync {
    /// Builds the entity shown while the create call is in flight.
    ///
    /// Implementations must mark the result speculative.
    fn speculate(&self, temporary_id: EntityId) -> E;
}

/// Partial change that can be applied to an entity locally.
///
/// Only needed when updates run in optimistic mode.
pub trait Patch<E: Entity>: Send + Sync {
    fn apply_to(&self, entity: &mut E);
}

#[cfg(test)]
mod tests {
    use super::{EntityId, TEMPORARY_ID_PREFIX};
    use std::collections::HashSet;

    #[test]
    fn temporary_ids_use_local_namespace() {
        let id = EntityId::temporary(TEMPORARY_ID_PREFIX);
        assert!(id.as_str().starts_with("tmp-"));
        assert!(id.is_temporary());
        assert!(!EntityId::from("task-1").is_temporary());
    }

    #[test]
    fn temporary_ids_do_not_repeat() {
        let ids = (0..1_000)
            .map(|_| EntityId::temporary(TEMPORARY_ID_PREFIX))
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn empty_prefix_never_marks_ids_temporary() {
        assert!(!EntityId::from("anything").is_temporary_with(""));
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let json = serde_json::to_value(EntityId::from("srv-1")).unwrap();
        assert_eq!(json, serde_json::json!("srv-1"));
    }
}

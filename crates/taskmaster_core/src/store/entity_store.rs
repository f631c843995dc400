//! Ordered, id-keyed in-memory entity collection.
//!
//! # Responsibility
//! - Hold the current best-known view of one collection.
//! - Provide the atomic insert/replace/remove primitives the mutator composes.
//!
//! # Invariants
//! - At most one entity per id.
//! - Iteration order equals insertion order; in-place replacement keeps position.
//! - `index[id]` is always the position of `id` in `entries`.

use crate::model::entity::{Entity, EntityId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EntityStore<E> {
    entries: Vec<E>,
    index: HashMap<EntityId, usize>,
}

impl<E> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `entities`; a repeated id replaces the earlier entry
    /// in place.
    pub fn from_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let mut store = Self::new();
        for entity in entities {
            store.upsert(entity);
        }
        store
    }

    /// Returns an owned snapshot in display order.
    pub fn get_all(&self) -> Vec<E> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.position(id).map(|position| &self.entries[position])
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the entity with the same id in place, or appends it.
    pub fn upsert(&mut self, entity: E) {
        match self.position(entity.id()) {
            Some(position) => self.entries[position] = entity,
            None => {
                self.index.insert(entity.id().clone(), self.entries.len());
                self.entries.push(entity);
            }
        }
    }

    /// Removes `id`, returning its former position and value. No-op if absent.
    pub fn remove(&mut self, id: &EntityId) -> Option<(usize, E)> {
        let position = self.index.remove(id)?;
        let removed = self.entries.remove(position);
        self.reindex_from(position);
        Some((position, removed))
    }

    /// Discards all prior contents, speculative entries included.
    pub fn replace_all(&mut self, entities: impl IntoIterator<Item = E>) {
        *self = Self::from_entities(entities);
    }

    /// Puts `entity` where `old_id` currently sits.
    ///
    /// If `entity`'s own id is already present elsewhere, that entry is dropped
    /// so the id stays unique. Falls back to [`EntityStore::upsert`] when
    /// `old_id` is absent.
    pub fn replace(&mut self, old_id: &EntityId, entity: E) {
        if entity.id() != old_id {
            if let Some(existing) = self.position(entity.id()) {
                if self.contains(old_id) {
                    self.entries.remove(existing);
                    self.index.remove(entity.id());
                    self.reindex_from(existing);
                }
            }
        }

        let Some(position) = self.position(old_id) else {
            self.upsert(entity);
            return;
        };

        self.index.remove(old_id);
        self.index.insert(entity.id().clone(), position);
        self.entries[position] = entity;
    }

    /// Inserts `entity` at `position` (clamped to the end).
    ///
    /// An entity whose id is already present is replaced in place instead.
    pub fn insert_at(&mut self, position: usize, entity: E) {
        if self.contains(entity.id()) {
            self.upsert(entity);
            return;
        }
        let position = position.min(self.entries.len());
        self.entries.insert(position, entity);
        self.reindex_from(position);
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, entity) in self.entries[start..].iter().enumerate() {
            self.index.insert(entity.id().clone(), start + offset);
        }
    }
}

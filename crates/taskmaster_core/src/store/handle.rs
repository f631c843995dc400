//! Shared ownership of one entity store.
//!
//! # Responsibility
//! - Give the owning mutator short, synchronous write sections.
//! - Give observers read-only value snapshots.
//! - Track per-id mutation tickets used to detect stale completions.
//!
//! # Invariants
//! - No lock guard escapes a closure, so none is held across an `.await`.
//! - Replacing the whole collection invalidates every outstanding ticket.

use crate::model::entity::{Entity, EntityId};
use crate::store::entity_store::EntityStore;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Identifies one mutation started against one id.
///
/// Tickets are issued from a single increasing sequence, so a larger ticket
/// always belongs to a later mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Ticket(u64);

pub(crate) struct StoreState<E> {
    pub(crate) store: EntityStore<E>,
    /// Latest unsettled ticket per id.
    tickets: HashMap<EntityId, Ticket>,
    /// Latest ticket ever issued per id, kept after settlement until nothing
    /// is in flight.
    last_touched: HashMap<EntityId, Ticket>,
    next_ticket: u64,
    in_flight: usize,
}

impl<E: Entity> StoreState<E> {
    fn new(store: EntityStore<E>) -> Self {
        Self {
            store,
            tickets: HashMap::new(),
            last_touched: HashMap::new(),
            next_ticket: 0,
            in_flight: 0,
        }
    }

    /// Issues a ticket for `id`, superseding any earlier one.
    pub(crate) fn issue_ticket(&mut self, id: &EntityId) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.tickets.insert(id.clone(), ticket);
        self.last_touched.insert(id.clone(), ticket);
        self.in_flight += 1;
        ticket
    }

    pub(crate) fn is_current(&self, id: &EntityId, ticket: Ticket) -> bool {
        self.tickets.get(id) == Some(&ticket)
    }

    /// Whether a mutation on `id` started after the one holding `ticket`.
    pub(crate) fn touched_after(&self, id: &EntityId, ticket: Ticket) -> bool {
        self.last_touched
            .get(id)
            .is_some_and(|touched| *touched > ticket)
    }

    /// Settles the mutation holding `ticket`. Must be called exactly once per
    /// issued ticket.
    pub(crate) fn release_ticket(&mut self, id: &EntityId, ticket: Ticket) {
        if self.is_current(id, ticket) {
            self.tickets.remove(id);
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.last_touched.clear();
        }
    }

    /// Invalidates every unsettled ticket; their mutations still count as in
    /// flight until they settle.
    pub(crate) fn replace_all(&mut self, entities: Vec<E>) {
        self.store.replace_all(entities);
        self.tickets.clear();
    }

    /// Mutations between apply and settlement, superseded ones included.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }
}

pub(crate) struct StoreHandle<E> {
    inner: Arc<RwLock<StoreState<E>>>,
}

impl<E> Clone for StoreHandle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> StoreHandle<E> {
    pub(crate) fn new(store: EntityStore<E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState::new(store))),
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState<E>) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut StoreState<E>) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn reader(&self) -> StoreReader<E> {
        StoreReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Read-only view of a mutator's store for rendering layers.
///
/// Every accessor returns owned values; nothing borrowed outlives the call.
pub struct StoreReader<E> {
    inner: Arc<RwLock<StoreState<E>>>,
}

impl<E> Clone for StoreReader<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> StoreReader<E> {
    pub fn snapshot(&self) -> Vec<E> {
        self.with(|store| store.get_all())
    }

    pub fn get(&self, id: &EntityId) -> Option<E> {
        self.with(|store| store.get(id).cloned())
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.with(|store| store.contains(id))
    }

    pub fn len(&self) -> usize {
        self.with(EntityStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(EntityStore::is_empty)
    }

    /// Number of speculative entities currently visible.
    pub fn speculative_count(&self) -> usize {
        self.with(|store| store.iter().filter(|entity| entity.is_speculative()).count())
    }

    fn with<R>(&self, f: impl FnOnce(&EntityStore<E>) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard.store)
    }
}

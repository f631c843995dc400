//! Per-invocation optimistic state machine.
//!
//! `Idle -> Applied -> {Committed | RolledBack}`. A [`PendingMutation`] exists
//! exactly while a mutation is `Applied`; settling consumes it, so no
//! invocation reaches both terminal states. Dropping it unsettled (e.g. a
//! cancelled caller) rolls it back.
//!
//! # Invariants
//! - Every transition runs inside one store write section.
//! - Stale completions (ticket superseded by a newer mutation or a full
//!   replace) skip update commits and delete rollbacks.
//! - A create commit whose speculative entity is gone skips its server entity
//!   when a later mutation already touched that server id.

use crate::model::entity::{Entity, EntityId, Patch};
use crate::store::{StoreHandle, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Applied,
    Committed,
    RolledBack,
}

pub(crate) struct PendingMutation<E: Entity> {
    handle: StoreHandle<E>,
    kind: MutationKind,
    /// Temp id for creates, the real id otherwise.
    target_id: EntityId,
    /// Pre-mutation entity for updates and deletes.
    original: Option<E>,
    original_position: Option<usize>,
    /// Whether the store already shows this mutation's effect.
    applied_locally: bool,
    ticket: Ticket,
    phase: MutationPhase,
}

impl<E: Entity> PendingMutation<E> {
    /// Shows `speculative` in the store.
    pub(crate) fn begin_create(handle: &StoreHandle<E>, speculative: E) -> Self {
        let target_id = speculative.id().clone();
        let ticket = handle.write(|state| {
            state.store.upsert(speculative);
            state.issue_ticket(&target_id)
        });
        Self {
            handle: handle.clone(),
            kind: MutationKind::Create,
            target_id,
            original: None,
            original_position: None,
            applied_locally: true,
            ticket,
            phase: MutationPhase::Applied,
        }
    }

    /// Records the current `id` and, when `local_patch` is given, applies it
    /// in place. Returns `None` when `id` is absent.
    pub(crate) fn begin_update(
        handle: &StoreHandle<E>,
        id: &EntityId,
        local_patch: Option<&dyn Patch<E>>,
    ) -> Option<Self> {
        let (position, original, ticket) = handle.write(|state| {
            let position = state.store.position(id)?;
            let original = state.store.get(id).cloned()?;
            if let Some(patch) = local_patch {
                let mut patched = original.clone();
                patch.apply_to(&mut patched);
                state.store.upsert(patched);
            }
            Some((position, original, state.issue_ticket(id)))
        })?;
        Some(Self {
            handle: handle.clone(),
            kind: MutationKind::Update,
            target_id: id.clone(),
            original: Some(original),
            original_position: Some(position),
            applied_locally: local_patch.is_some(),
            ticket,
            phase: MutationPhase::Applied,
        })
    }

    /// Removes `id` from the store. Returns `None` when `id` is absent.
    pub(crate) fn begin_delete(handle: &StoreHandle<E>, id: &EntityId) -> Option<Self> {
        let (position, original, ticket) = handle.write(|state| {
            let (position, original) = state.store.remove(id)?;
            Some((position, original, state.issue_ticket(id)))
        })?;
        Some(Self {
            handle: handle.clone(),
            kind: MutationKind::Delete,
            target_id: id.clone(),
            original: Some(original),
            original_position: Some(position),
            applied_locally: true,
            ticket,
            phase: MutationPhase::Applied,
        })
    }

    /// Settles successfully. `confirmed` is the server entity for creates and
    /// updates and is stored non-speculative.
    pub(crate) fn commit(mut self, confirmed: Option<E>) {
        let kind = self.kind;
        let ticket = self.ticket;
        let target_id = &self.target_id;
        self.handle.write(|state| {
            let current = state.is_current(target_id, ticket);
            match (kind, confirmed) {
                (MutationKind::Create, Some(mut entity)) => {
                    entity.set_speculative(false);
                    let superseded = !state.store.contains(target_id)
                        && state.touched_after(entity.id(), ticket);
                    if !superseded {
                        state.store.replace(target_id, entity);
                    }
                }
                (MutationKind::Create, None) => {
                    state.store.remove(target_id);
                }
                (MutationKind::Update, Some(mut entity)) if current => {
                    entity.set_speculative(false);
                    state.store.upsert(entity);
                }
                (MutationKind::Update, _) | (MutationKind::Delete, _) => {}
            }
            state.release_ticket(target_id, ticket);
        });
        self.phase = MutationPhase::Committed;
    }

    /// Settles unsuccessfully, reverting whatever this mutation applied.
    pub(crate) fn roll_back(mut self) {
        self.revert();
    }

    fn revert(&mut self) {
        let kind = self.kind;
        let ticket = self.ticket;
        let applied_locally = self.applied_locally;
        let position = self.original_position.unwrap_or(usize::MAX);
        let original = self.original.take();
        let target_id = &self.target_id;
        self.handle.write(|state| {
            let current = state.is_current(target_id, ticket);
            match (kind, original) {
                (MutationKind::Create, _) => {
                    state.store.remove(target_id);
                }
                (MutationKind::Update, Some(original)) if current && applied_locally => {
                    state.store.upsert(original);
                }
                (MutationKind::Delete, Some(original)) if current => {
                    state.store.insert_at(position, original);
                }
                (MutationKind::Update, _) | (MutationKind::Delete, _) => {}
            }
            state.release_ticket(target_id, ticket);
        });
        self.phase = MutationPhase::RolledBack;
    }
}

impl<E: Entity> Drop for PendingMutation<E> {
    fn drop(&mut self) {
        if self.phase == MutationPhase::Applied {
            self.revert();
        }
    }
}

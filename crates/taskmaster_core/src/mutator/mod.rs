//! Optimistic create/update/delete over one entity collection.
//!
//! # Responsibility
//! - Apply speculative changes to the owned store before remote calls settle.
//! - Commit server-confirmed results or roll the store back on failure.
//!
//! # Invariants
//! - Invalid create input never touches the store or the remote source.
//! - Each invocation reaches exactly one of `Committed` or `RolledBack`.
//! - The store is reverted before a failure is returned to the caller.
//! - Store writes happen only before the remote call and after it settles;
//!   the remote call is the only suspension point.
//! - A mutation whose future is dropped before settlement is rolled back.
//! - This module emits no logs; callers own observability.

mod error;
mod pending;

pub use error::{MutationError, MutationResult};
pub use pending::{MutationKind, MutationPhase};

use crate::config::{MutatorConfig, UpdateMode};
use crate::model::entity::{Draft, Entity, EntityId, Patch};
use crate::remote::RemoteSource;
use crate::store::{EntityStore, StoreHandle, StoreReader};
use crate::validation::Validator;
use pending::PendingMutation;
use std::sync::Arc;

/// Owns one collection's store and drives its optimistic mutations.
///
/// `I` is the create input, `P` the update patch. Methods take `&self`, so a
/// mutator can be shared (e.g. in an `Arc`) by concurrent callers.
pub struct OptimisticMutator<E, I, P> {
    store: StoreHandle<E>,
    remote: Arc<dyn RemoteSource<E, I, P>>,
    validator: Arc<dyn Validator<I>>,
    config: MutatorConfig,
}

impl<E, I, P> OptimisticMutator<E, I, P>
where
    E: Entity,
    I: Draft<E>,
    P: Patch<E>,
{
    pub fn new(remote: Arc<dyn RemoteSource<E, I, P>>, validator: Arc<dyn Validator<I>>) -> Self {
        Self::with_config(remote, validator, MutatorConfig::default())
    }

    pub fn with_config(
        remote: Arc<dyn RemoteSource<E, I, P>>,
        validator: Arc<dyn Validator<I>>,
        config: MutatorConfig,
    ) -> Self {
        Self {
            store: StoreHandle::new(EntityStore::new()),
            remote,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &MutatorConfig {
        &self.config
    }

    /// Returns a read-only handle for observers.
    pub fn reader(&self) -> StoreReader<E> {
        self.store.reader()
    }

    /// Owned snapshot of the store in display order.
    pub fn snapshot(&self) -> Vec<E> {
        self.store.read(|state| state.store.get_all())
    }

    pub fn get(&self, id: &EntityId) -> Option<E> {
        self.store.read(|state| state.store.get(id).cloned())
    }

    /// Number of mutations currently between apply and settlement.
    ///
    /// Mutations made stale by a full replace still count until their remote
    /// call settles.
    pub fn in_flight(&self) -> usize {
        self.store.read(|state| state.in_flight())
    }

    /// Creates an entity optimistically.
    ///
    /// The speculative entity is visible from the moment the remote call
    /// starts. On success it is replaced, at the same position, by the server
    /// entity, which is returned.
    ///
    /// # Errors
    /// - `InvalidInput` when validation rejects `input`; nothing is applied.
    /// - `CreateFailed` when the remote call fails; the speculative entity is
    ///   gone before this returns.
    pub async fn create(&self, input: I) -> MutationResult<E> {
        let input = self
            .validator
            .validate(input)
            .map_err(MutationError::InvalidInput)?;

        let temporary_id = self.mint_temporary_id();
        let pending = PendingMutation::begin_create(&self.store, input.speculate(temporary_id));

        match self.remote.create(&input).await {
            Ok(mut confirmed) => {
                confirmed.set_speculative(false);
                pending.commit(Some(confirmed.clone()));
                Ok(confirmed)
            }
            Err(source) => {
                pending.roll_back();
                Err(MutationError::CreateFailed(source))
            }
        }
    }

    /// Updates an existing entity.
    ///
    /// In [`UpdateMode::Confirmed`] the store changes only once the remote
    /// call succeeds. In [`UpdateMode::Optimistic`] `patch` is applied locally
    /// first and reverted if the call fails.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not in the store; no remote call is made.
    /// - `UpdateFailed` when the remote call fails.
    pub async fn update(&self, id: &EntityId, patch: P) -> MutationResult<E> {
        let local_patch: Option<&dyn Patch<E>> = match self.config.update_mode {
            UpdateMode::Confirmed => None,
            UpdateMode::Optimistic => Some(&patch),
        };
        let pending = PendingMutation::begin_update(&self.store, id, local_patch)
            .ok_or_else(|| MutationError::NotFound(id.clone()))?;

        match self.remote.update(id, &patch).await {
            Ok(mut confirmed) => {
                confirmed.set_speculative(false);
                pending.commit(Some(confirmed.clone()));
                Ok(confirmed)
            }
            Err(source) => {
                pending.roll_back();
                Err(MutationError::UpdateFailed {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    /// Deletes an entity optimistically.
    ///
    /// The entity disappears from the store before the remote call starts and
    /// reappears at its former position if the call fails. Not idempotent: a
    /// second delete of the same id fails with `NotFound`.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not in the store; no remote call is made.
    /// - `DeleteFailed` when the remote call fails.
    pub async fn delete(&self, id: &EntityId) -> MutationResult<()> {
        let pending = PendingMutation::begin_delete(&self.store, id)
            .ok_or_else(|| MutationError::NotFound(id.clone()))?;

        match self.remote.delete(id).await {
            Ok(()) => {
                pending.commit(None);
                Ok(())
            }
            Err(source) => {
                pending.roll_back();
                Err(MutationError::DeleteFailed {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    /// Reloads the whole collection from the remote source.
    ///
    /// A successful refresh supersedes local optimism: speculative entities
    /// are discarded and in-flight mutations become stale. A failed refresh
    /// leaves the store untouched.
    pub async fn refresh(&self) -> MutationResult<Vec<E>> {
        let entities = self
            .remote
            .fetch_all()
            .await
            .map_err(MutationError::RefreshFailed)?;
        self.replace_all(entities);
        Ok(self.snapshot())
    }

    /// Replaces the store contents with an externally loaded list.
    pub fn replace_all(&self, entities: Vec<E>) {
        let entities = entities
            .into_iter()
            .map(|mut entity| {
                entity.set_speculative(false);
                entity
            })
            .collect();
        self.store.write(|state| state.replace_all(entities));
    }

    fn mint_temporary_id(&self) -> EntityId {
        loop {
            let candidate = EntityId::temporary(&self.config.temporary_id_prefix);
            if !self.store.read(|state| state.store.contains(&candidate)) {
                return candidate;
            }
        }
    }
}

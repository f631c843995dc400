//! In-process remote source for demos and tests.
//!
//! # Responsibility
//! - Behave like a backend: assign server ids, keep the authoritative list.
//! - Allow scripted failures, an offline switch, and artificial latency.
//!
//! # Invariants
//! - Server ids are `<prefix>-<n>` and never reuse the temporary namespace.
//! - Entities returned from this source are never speculative.

use crate::model::entity::{Draft, Entity, EntityId, Patch};
use crate::remote::{RemoteError, RemoteResult, RemoteSource};
use crate::store::EntityStore;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One kind of backend call, used for failure scripting and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCall {
    Create,
    Update,
    Delete,
    FetchAll,
}

#[derive(Default)]
struct CallCounters {
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
    fetch_all: AtomicUsize,
}

impl CallCounters {
    fn counter(&self, call: RemoteCall) -> &AtomicUsize {
        match call {
            RemoteCall::Create => &self.create,
            RemoteCall::Update => &self.update,
            RemoteCall::Delete => &self.delete,
            RemoteCall::FetchAll => &self.fetch_all,
        }
    }
}

struct BackendState<E> {
    records: EntityStore<E>,
    next_id: u64,
    scripted_failures: HashMap<RemoteCall, VecDeque<RemoteError>>,
}

/// Generic in-memory backend for any entity whose create input is a
/// [`Draft`] and whose patch is a [`Patch`].
pub struct InMemoryBackend<E> {
    id_prefix: String,
    state: Mutex<BackendState<E>>,
    offline: AtomicBool,
    latency: Option<Duration>,
    calls: CallCounters,
}

impl<E: Entity> InMemoryBackend<E> {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            state: Mutex::new(BackendState {
                records: EntityStore::new(),
                next_id: 1,
                scripted_failures: HashMap::new(),
            }),
            offline: AtomicBool::new(false),
            latency: None,
            calls: CallCounters::default(),
        }
    }

    /// Delays every call by `latency` before it answers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seeds server-side records; they are stored confirmed.
    pub async fn seed(&self, entities: impl IntoIterator<Item = E>) {
        let mut state = self.state.lock().await;
        for mut entity in entities {
            entity.set_speculative(false);
            state.records.upsert(entity);
        }
    }

    /// Makes the next `call` fail with `error`. Queued failures are consumed
    /// in order.
    pub async fn fail_next(&self, call: RemoteCall, error: RemoteError) {
        self.state
            .lock()
            .await
            .scripted_failures
            .entry(call)
            .or_default()
            .push_back(error);
    }

    /// While offline, every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self, call: RemoteCall) -> usize {
        self.calls.counter(call).load(Ordering::SeqCst)
    }

    pub async fn records(&self) -> Vec<E> {
        self.state.lock().await.records.get_all()
    }

    async fn begin(&self, call: RemoteCall) -> RemoteResult<()> {
        self.calls.counter(call).fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::network("backend unreachable"));
        }
        let scripted = self
            .state
            .lock()
            .await
            .scripted_failures
            .get_mut(&call)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E, I, P> RemoteSource<E, I, P> for InMemoryBackend<E>
where
    E: Entity,
    I: Draft<E>,
    P: Patch<E>,
{
    async fn create(&self, input: &I) -> RemoteResult<E> {
        self.begin(RemoteCall::Create).await?;
        let mut state = self.state.lock().await;
        let id = EntityId::new(format!("{}-{}", self.id_prefix, state.next_id));
        state.next_id += 1;

        let mut entity = input.speculate(id);
        entity.set_speculative(false);
        state.records.upsert(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &EntityId, patch: &P) -> RemoteResult<E> {
        self.begin(RemoteCall::Update).await?;
        let mut state = self.state.lock().await;
        let Some(mut entity) = state.records.get(id).cloned() else {
            return Err(RemoteError::rejected(404, format!("no record with id {id}")));
        };
        patch.apply_to(&mut entity);
        state.records.upsert(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: &EntityId) -> RemoteResult<()> {
        self.begin(RemoteCall::Delete).await?;
        match self.state.lock().await.records.remove(id) {
            Some(_) => Ok(()),
            None => Err(RemoteError::rejected(404, format!("no record with id {id}"))),
        }
    }

    async fn fetch_all(&self) -> RemoteResult<Vec<E>> {
        self.begin(RemoteCall::FetchAll).await?;
        Ok(self.state.lock().await.records.get_all())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryBackend, RemoteCall};
    use crate::model::entity::{Entity, EntityId};
    use crate::model::task::{NewTask, Task, TaskPatch, TaskStatus};
    use crate::remote::{RemoteError, RemoteErrorKind, RemoteSource};

    type TaskRemote = dyn RemoteSource<Task, NewTask, TaskPatch>;

    #[tokio::test]
    async fn create_assigns_sequential_server_ids() {
        let backend = InMemoryBackend::<Task>::new("task");
        let remote: &TaskRemote = &backend;

        let first = remote.create(&NewTask::titled("a")).await.unwrap();
        let second = remote.create(&NewTask::titled("b")).await.unwrap();

        assert_eq!(first.id().as_str(), "task-1");
        assert_eq!(second.id().as_str(), "task-2");
        assert!(!first.is_speculative());
        assert_eq!(backend.calls(RemoteCall::Create), 2);
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_once() {
        let backend = InMemoryBackend::<Task>::new("task");
        backend
            .fail_next(RemoteCall::Create, RemoteError::timeout("slow"))
            .await;
        let remote: &TaskRemote = &backend;

        let err = remote.create(&NewTask::titled("a")).await.unwrap_err();
        assert_eq!(err.kind(), RemoteErrorKind::Timeout);
        assert!(remote.create(&NewTask::titled("a")).await.is_ok());
        assert_eq!(backend.records().await.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_are_rejected() {
        let backend = InMemoryBackend::<Task>::new("task");
        let remote: &TaskRemote = &backend;
        let ghost = EntityId::from("task-404");

        let err = remote
            .update(&ghost, &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RemoteErrorKind::Rejected { status: 404 });
        assert!(remote.delete(&ghost).await.is_err());
    }

    #[tokio::test]
    async fn offline_backend_fails_every_call() {
        let backend = InMemoryBackend::<Task>::new("task");
        backend.seed(vec![Task::new("task-1", "seeded")]).await;
        backend.set_offline(true);
        let remote: &TaskRemote = &backend;

        let err = remote.fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), RemoteErrorKind::Network);

        backend.set_offline(false);
        assert_eq!(remote.fetch_all().await.unwrap().len(), 1);
    }
}

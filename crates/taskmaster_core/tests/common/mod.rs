#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use taskmaster_core::{
    EntityId, InMemoryBackend, MutatorConfig, NewTask, RemoteCall, RemoteError, RemoteResult,
    RemoteSource, Task, TaskMutator, TaskPatch, TaskValidator,
};
use tokio::sync::Semaphore;

/// Remote source that parks every call until the test releases it.
///
/// Lets a test observe the store between apply and settlement.
pub struct GatedRemote {
    pub backend: InMemoryBackend<Task>,
    gate: Semaphore,
    started: AtomicUsize,
}

impl GatedRemote {
    pub fn new() -> Self {
        Self {
            backend: InMemoryBackend::new("srv"),
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
        }
    }

    /// Lets `count` parked (or future) calls proceed.
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Yields until at least `count` calls reached the remote.
    pub async fn wait_started(&self, count: usize) {
        while self.started() < count {
            tokio::task::yield_now().await;
        }
    }

    async fn pass_gate(&self) -> RemoteResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        match self.gate.acquire().await {
            Ok(permit) => {
                permit.forget();
                Ok(())
            }
            Err(_) => Err(RemoteError::network("gate closed")),
        }
    }

    fn inner(&self) -> &dyn RemoteSource<Task, NewTask, TaskPatch> {
        &self.backend
    }
}

#[async_trait]
impl RemoteSource<Task, NewTask, TaskPatch> for GatedRemote {
    async fn create(&self, input: &NewTask) -> RemoteResult<Task> {
        self.pass_gate().await?;
        self.inner().create(input).await
    }

    async fn update(&self, id: &EntityId, patch: &TaskPatch) -> RemoteResult<Task> {
        self.pass_gate().await?;
        self.inner().update(id, patch).await
    }

    async fn delete(&self, id: &EntityId) -> RemoteResult<()> {
        self.pass_gate().await?;
        self.inner().delete(id).await
    }

    async fn fetch_all(&self) -> RemoteResult<Vec<Task>> {
        self.pass_gate().await?;
        self.inner().fetch_all().await
    }
}

pub fn task_mutator(remote: Arc<dyn RemoteSource<Task, NewTask, TaskPatch>>) -> TaskMutator {
    TaskMutator::new(remote, Arc::new(TaskValidator))
}

pub fn task_mutator_with(
    remote: Arc<dyn RemoteSource<Task, NewTask, TaskPatch>>,
    config: MutatorConfig,
) -> TaskMutator {
    TaskMutator::with_config(remote, Arc::new(TaskValidator), config)
}

/// Backend plus a mutator whose store mirrors `seed` on both sides.
pub async fn seeded(seed: Vec<Task>) -> (Arc<InMemoryBackend<Task>>, TaskMutator) {
    let backend = Arc::new(InMemoryBackend::new("srv"));
    backend.seed(seed.clone()).await;
    let mutator = task_mutator(backend.clone());
    mutator.replace_all(seed);
    (backend, mutator)
}

pub fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|task| task.id.to_string()).collect()
}

pub fn remote_calls(backend: &InMemoryBackend<Task>) -> usize {
    [
        RemoteCall::Create,
        RemoteCall::Update,
        RemoteCall::Delete,
        RemoteCall::FetchAll,
    ]
    .into_iter()
    .map(|call| backend.calls(call))
    .sum()
}

/// Remote source whose creates reach the backend at once but whose replies
/// wait for the test. Every other call passes straight through.
pub struct LateAckRemote {
    pub backend: InMemoryBackend<Task>,
    gate: Semaphore,
    applied: AtomicUsize,
}

impl LateAckRemote {
    pub fn new() -> Self {
        Self {
            backend: InMemoryBackend::new("srv"),
            gate: Semaphore::new(0),
            applied: AtomicUsize::new(0),
        }
    }

    /// Lets `count` held create replies through.
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// Yields until at least `count` creates were stored by the backend.
    pub async fn wait_applied(&self, count: usize) {
        while self.applied.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    fn inner(&self) -> &dyn RemoteSource<Task, NewTask, TaskPatch> {
        &self.backend
    }
}

#[async_trait]
impl RemoteSource<Task, NewTask, TaskPatch> for LateAckRemote {
    async fn create(&self, input: &NewTask) -> RemoteResult<Task> {
        let created = self.inner().create(input).await;
        self.applied.fetch_add(1, Ordering::SeqCst);
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(RemoteError::network("gate closed")),
        }
        created
    }

    async fn update(&self, id: &EntityId, patch: &TaskPatch) -> RemoteResult<Task> {
        self.inner().update(id, patch).await
    }

    async fn delete(&self, id: &EntityId) -> RemoteResult<()> {
        self.inner().delete(id).await
    }

    async fn fetch_all(&self) -> RemoteResult<Vec<Task>> {
        self.inner().fetch_all().await
    }
}

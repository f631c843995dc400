mod common;

use common::{ids, remote_calls, seeded, task_mutator, task_mutator_with, GatedRemote};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use taskmaster_core::{
    Entity, InMemoryBackend, MutationError, MutatorConfig, NewTask, RemoteCall, RemoteError,
    Task,
};

#[tokio::test]
async fn create_shows_speculative_entity_then_commits_server_entity() {
    let remote = Arc::new(GatedRemote::new());
    let mutator = Arc::new(task_mutator(remote.clone()));

    let call = tokio::spawn({
        let mutator = Arc::clone(&mutator);
        async move { mutator.create(NewTask::titled("Buy milk")).await }
    });
    remote.wait_started(1).await;

    let applied = mutator.snapshot();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].is_speculative());
    assert!(applied[0].id().is_temporary());
    assert_eq!(applied[0].title, "Buy milk");
    assert_eq!(mutator.in_flight(), 1);

    remote.release(1);
    let created = call.await.expect("join").expect("create succeeds");

    assert_eq!(created.id.as_str(), "srv-1");
    assert!(!created.is_speculative());
    let committed = mutator.snapshot();
    assert_eq!(committed, vec![created]);
    assert_eq!(mutator.in_flight(), 0);
}

#[tokio::test]
async fn committed_entity_takes_the_position_of_its_speculative_entity() {
    let remote = Arc::new(GatedRemote::new());
    let mutator = Arc::new(task_mutator(remote.clone()));
    mutator.replace_all(vec![Task::new("a", "A")]);

    let call = tokio::spawn({
        let mutator = Arc::clone(&mutator);
        async move { mutator.create(NewTask::titled("B")).await }
    });
    remote.wait_started(1).await;

    let second = tokio::spawn({
        let mutator = Arc::clone(&mutator);
        async move { mutator.create(NewTask::titled("C")).await }
    });
    remote.wait_started(2).await;

    remote.release(2);
    call.await.expect("join").expect("first create");
    second.await.expect("join").expect("second create");

    let titles = mutator
        .snapshot()
        .into_iter()
        .map(|task| task.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert!(mutator.snapshot().iter().all(|task| !task.is_speculative()));
}

#[tokio::test]
async fn failed_create_rolls_back_and_reports_create_failed() {
    let (backend, mutator) = seeded(vec![Task::new("1", "A")]).await;
    backend
        .fail_next(RemoteCall::Create, RemoteError::rejected(500, "boom"))
        .await;
    let before = ids(&mutator.snapshot());

    let err = mutator
        .create(NewTask::titled("doomed"))
        .await
        .expect_err("create must fail");

    assert!(matches!(err, MutationError::CreateFailed(_)));
    assert_eq!(ids(&mutator.snapshot()), before);
    assert!(mutator.snapshot().iter().all(|task| !task.id.is_temporary()));
    assert_eq!(mutator.in_flight(), 0);
}

#[tokio::test]
async fn invalid_input_never_touches_store_or_remote() {
    let (backend, mutator) = seeded(vec![Task::new("1", "A")]).await;
    let before = mutator.snapshot();

    for input in [
        NewTask::titled(""),
        NewTask::titled("   "),
        NewTask::titled("x".repeat(201)),
    ] {
        let err = mutator.create(input).await.expect_err("invalid input");
        match err {
            MutationError::InvalidInput(errors) => assert!(errors.has_field("title")),
            other => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(mutator.snapshot(), before);
    assert_eq!(remote_calls(&backend), 0);
}

#[tokio::test]
async fn empty_title_on_empty_store_returns_invalid_input() {
    let backend = Arc::new(InMemoryBackend::<Task>::new("srv"));
    let mutator = task_mutator(backend.clone());

    let err = mutator
        .create(NewTask::titled(""))
        .await
        .expect_err("empty title");

    assert_eq!(err.code(), "invalid_input");
    assert!(mutator.snapshot().is_empty());
    assert_eq!(backend.calls(RemoteCall::Create), 0);
}

#[tokio::test]
async fn validated_input_is_what_reaches_the_remote() {
    let backend = Arc::new(InMemoryBackend::<Task>::new("srv"));
    let mutator = task_mutator(backend.clone());

    let created = mutator
        .create(NewTask::titled("  padded  "))
        .await
        .expect("create");

    assert_eq!(created.title, "padded");
    assert_eq!(backend.records().await[0].title, "padded");
}

#[tokio::test]
async fn temporary_ids_use_configured_prefix() {
    let remote = Arc::new(GatedRemote::new());
    let config = MutatorConfig::default()
        .with_temporary_id_prefix("local-")
        .expect("prefix");
    let mutator = Arc::new(task_mutator_with(remote.clone(), config));

    let call = tokio::spawn({
        let mutator = Arc::clone(&mutator);
        async move { mutator.create(NewTask::titled("prefixed")).await }
    });
    remote.wait_started(1).await;

    let pending = mutator.snapshot();
    assert!(pending[0].id.is_temporary_with("local-"));
    assert!(!pending[0].id.is_temporary());

    remote.release(1);
    call.await.expect("join").expect("create");
}

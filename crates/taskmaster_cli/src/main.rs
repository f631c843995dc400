//! CLI demo entry point.
//!
//! # Responsibility
//! - Wire runtime config, logging and a task service over the in-process
//!   backend.
//! - Walk one create, one failing delete and one refresh so the optimistic
//!   apply/rollback cycle is visible on stdout.

use log::info;
use std::error::Error;
use std::sync::Arc;
use taskmaster_core::{
    core_version, init_logging, InMemoryBackend, LoggingConfig, NewTask, RemoteCall, RemoteError,
    RuntimeConfig, Task, TaskFilter, TaskService,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("taskmaster: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = RuntimeConfig::from_env()?;
    init_logging(&logging_config(&config)?)?;
    info!(
        "event=cli_start module=cli status=ok version={} update_mode={}",
        core_version(),
        config.update_mode.as_str()
    );

    let mut backend = InMemoryBackend::<Task>::new("task");
    if let Some(latency) = config.remote_latency {
        backend = backend.with_latency(latency);
    }
    let backend = Arc::new(backend);
    let service = TaskService::with_config(backend.clone(), config.mutator_config());

    let created = service
        .create_task(NewTask::titled("Try optimistic updates"))
        .await?;
    println!("created {} \"{}\"", created.id, created.title);

    backend
        .fail_next(RemoteCall::Delete, RemoteError::timeout("simulated timeout"))
        .await;
    match service.delete_task(&created.id).await {
        Ok(()) => println!("deleted {}", created.id),
        Err(err) => println!("delete rolled back: {err}"),
    }

    service.complete_task(&created.id).await?;
    service.refresh().await?;
    for task in service.list_tasks(&TaskFilter::default()) {
        let mark = if task.is_done() { "x" } else { " " };
        println!("[{mark}] {} {}", task.id, task.title);
    }
    println!("taskmaster_core version={}", core_version());
    Ok(())
}

fn logging_config(config: &RuntimeConfig) -> Result<LoggingConfig, Box<dyn Error>> {
    let Some(dir) = &config.log_dir else {
        return Ok(LoggingConfig::stderr(config.log_level));
    };
    let dir = if dir.is_absolute() {
        dir.clone()
    } else {
        std::env::current_dir()?.join(dir)
    };
    Ok(LoggingConfig::files(config.log_level, dir))
}

//! TaskMaster use-case services.
//!
//! # Responsibility
//! - Wrap one optimistic mutator per collection into use-case level APIs.
//! - Emit one metadata-only log line per use-case outcome.

pub mod project_service;
pub mod task_service;

use crate::model::entity::EntityId;
use crate::mutator::{MutationError, MutationResult};
use log::{info, warn};

pub(crate) fn log_outcome<T>(
    event: &str,
    module: &str,
    target: Option<&EntityId>,
    result: &MutationResult<T>,
) {
    let target = target.map(EntityId::as_str).unwrap_or("-");
    match result {
        Ok(_) => info!("event={event} module={module} status=ok id={target}"),
        Err(err) => warn!(
            "event={event} module={module} status=error id={target} code={} remote={}",
            err.code(),
            remote_kind(err)
        ),
    }
}

fn remote_kind(err: &MutationError) -> String {
    err.remote_error()
        .map(|remote| remote.kind().to_string())
        .unwrap_or_else(|| "-".to_string())
}

//! Remote source contract consumed by the optimistic mutator.
//!
//! # Responsibility
//! - Describe the asynchronous calls a collection makes to its backend.
//! - Carry remote failures as opaque values.
//!
//! # Invariants
//! - Every call eventually settles; timeouts are the implementation's job.
//! - Core never branches on [`RemoteErrorKind`]; it is diagnostic only.

pub mod in_memory;

use crate::model::entity::EntityId;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Coarse failure category reported by a remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Timeout,
    Network,
    /// Backend answered with a non-success status.
    Rejected { status: u16 },
    /// Backend answered with a body that could not be decoded.
    Decode,
}

impl Display for RemoteErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Network => f.write_str("network"),
            Self::Rejected { status } => write!(f, "rejected({status})"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("remote {kind} error: {message}")]
pub struct RemoteError {
    kind: RemoteErrorKind,
    message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected { status }, message)
    }

    pub fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Backend calls for one collection.
///
/// `I` is the validated create input, `P` the update patch.
#[async_trait]
pub trait RemoteSource<E, I, P>: Send + Sync {
    /// Creates an entity and returns it with its server-assigned id.
    async fn create(&self, input: &I) -> RemoteResult<E>;

    /// Applies `patch` to `id` and returns the server's updated entity.
    async fn update(&self, id: &EntityId, patch: &P) -> RemoteResult<E>;

    async fn delete(&self, id: &EntityId) -> RemoteResult<()>;

    /// Returns the full current collection, in display order.
    async fn fetch_all(&self) -> RemoteResult<Vec<E>>;
}

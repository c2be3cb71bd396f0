//! Repository layer over the key-value persistence port.
//!
//! # Responsibility
//! - Provide use-case oriented CRUD for favorites, visits and plans.
//! - Isolate JSON payload encoding from service/business orchestration.
//!
//! # Invariants
//! - Every mutation is one full read-modify-write of a single namespace.
//! - Repositories hold no cached copies; a failed write changes nothing.
//! - Missing namespaces read as empty; unparsable payloads are errors.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod namespace;
pub mod plan_repo;
pub mod user_data_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from user-data repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Storage read/write failure.
    Store(StoreError),
    /// Another writer committed the namespace since it was read.
    Conflict(&'static str),
    /// Persisted payload cannot be decoded.
    InvalidData {
        namespace: &'static str,
        message: String,
    },
    /// Payload could not be encoded.
    Serialize(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Conflict(namespace) => write!(
                f,
                "namespace `{namespace}` was modified concurrently; reload and retry"
            ),
            Self::InvalidData { namespace, message } => {
                write!(f, "invalid persisted data in `{namespace}`: {message}")
            }
            Self::Serialize(err) => write!(f, "failed to encode payload: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Conflict(_) => None,
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

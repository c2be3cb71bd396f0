//! Typed JSON read-modify-write over one storage namespace.

use crate::repo::{RepoError, RepoResult};
use crate::store::{KeyValueStore, StoreError};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Logical user-data namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Favorites,
    Visits,
    Plans,
    Onboarding,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Favorites,
        Namespace::Visits,
        Namespace::Plans,
        Namespace::Onboarding,
    ];

    /// Storage key for this namespace.
    pub fn key(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::Visits => "visits",
            Self::Plans => "plans",
            Self::Onboarding => "onboarding",
        }
    }
}

/// Decoded namespace value plus the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub value: T,
    version: Option<u64>,
}

impl<T> Snapshot<T> {
    /// Version the value was read at. `None` when the namespace was absent.
    pub fn version(&self) -> Option<u64> {
        self.version
    }
}

/// Typed access to namespaces of a [`KeyValueStore`].
pub struct NamespaceStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> NamespaceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads one namespace; absent namespaces decode as `T::default()`.
    pub fn load<T>(&self, namespace: Namespace) -> RepoResult<Snapshot<T>>
    where
        T: DeserializeOwned + Default,
    {
        let Some(stored) = self.store.get(namespace.key())? else {
            return Ok(Snapshot {
                value: T::default(),
                version: None,
            });
        };

        let value = serde_json::from_slice(&stored.payload).map_err(|err| {
            error!(
                "event=ns_load module=repo status=error namespace={} version={} error_code=invalid_payload",
                namespace.key(),
                stored.version
            );
            RepoError::InvalidData {
                namespace: namespace.key(),
                message: err.to_string(),
            }
        })?;

        Ok(Snapshot {
            value,
            version: Some(stored.version),
        })
    }

    /// Writes `value` if the namespace is still at the snapshot's version.
    pub fn commit<T: Serialize>(
        &self,
        namespace: Namespace,
        snapshot: &Snapshot<T>,
    ) -> RepoResult<u64> {
        let payload = serde_json::to_vec(&snapshot.value).map_err(RepoError::Serialize)?;
        match self.store.set(namespace.key(), &payload, snapshot.version) {
            Ok(version) => Ok(version),
            Err(StoreError::VersionConflict { .. }) => {
                warn!(
                    "event=ns_commit module=repo status=conflict namespace={}",
                    namespace.key()
                );
                Err(RepoError::Conflict(namespace.key()))
            }
            Err(err) => {
                error!(
                    "event=ns_commit module=repo status=error namespace={} error={}",
                    namespace.key(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Loads, applies `mutate`, and commits only when it reports a change.
    ///
    /// Returns whatever `mutate` returned alongside the change flag.
    pub fn update<T, R>(
        &self,
        namespace: Namespace,
        mutate: impl FnOnce(&mut T) -> (bool, R),
    ) -> RepoResult<R>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let mut snapshot = self.load::<T>(namespace)?;
        let (changed, result) = mutate(&mut snapshot.value);
        if changed {
            self.commit(namespace, &snapshot)?;
        }
        Ok(result)
    }

    /// Removes one namespace.
    pub fn remove(&self, namespace: Namespace) -> RepoResult<()> {
        self.store.remove(namespace.key())?;
        Ok(())
    }
}

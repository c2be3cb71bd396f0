//! Favorites/visits repository.
//!
//! # Responsibility
//! - Provide CRUD for favorites and visits over the key-value port.
//! - Own the onboarding flag, usage stats and the bulk clear operation.
//!
//! # Invariants
//! - `add_favorite` is a no-op when the key exists (first `added_at` wins).
//! - `add_visit` upserts in place (position kept, `visited_at`/`memo` replaced).
//! - Insertion order of both lists is preserved.

use crate::clock::Clock;
use crate::model::catalog::{ItemKey, ItemType};
use crate::model::user_data::{Favorite, Plan, UserDataStats, Visit};
use crate::repo::namespace::{Namespace, NamespaceStore};
use crate::repo::RepoResult;
use crate::store::KeyValueStore;
use log::info;

/// Repository for favorites, visits and small per-device flags.
pub struct UserDataRepository<S: KeyValueStore, C: Clock> {
    namespaces: NamespaceStore<S>,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> UserDataRepository<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            namespaces: NamespaceStore::new(store),
            clock,
        }
    }

    /// Returns all favorites in insertion order.
    pub fn get_favorites(&self) -> RepoResult<Vec<Favorite>> {
        Ok(self.namespaces.load(Namespace::Favorites)?.value)
    }

    pub fn is_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        Ok(self
            .get_favorites()?
            .iter()
            .any(|favorite| favorite.matches(key)))
    }

    /// Adds a favorite unless one already exists for `key`.
    ///
    /// Returns `true` when a record was appended.
    pub fn add_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        let now_ms = self.clock.now_ms();
        let added = self
            .namespaces
            .update(Namespace::Favorites, |favorites: &mut Vec<Favorite>| {
                if favorites.iter().any(|favorite| favorite.matches(key)) {
                    return (false, false);
                }
                favorites.push(Favorite {
                    item_id: key.item_id.clone(),
                    item_type: key.item_type,
                    added_at: now_ms,
                });
                (true, true)
            })?;
        if added {
            info!(
                "event=favorite_add module=repo status=ok item_type={}",
                key.item_type
            );
        }
        Ok(added)
    }

    /// Removes the favorite for `key`. Returns `true` when one was removed.
    pub fn remove_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        self.namespaces
            .update(Namespace::Favorites, |favorites: &mut Vec<Favorite>| {
                let before = favorites.len();
                favorites.retain(|favorite| !favorite.matches(key));
                let removed = favorites.len() != before;
                (removed, removed)
            })
    }

    /// Flips favorite membership in one write. Returns the new state.
    pub fn toggle_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        let now_ms = self.clock.now_ms();
        self.namespaces
            .update(Namespace::Favorites, |favorites: &mut Vec<Favorite>| {
                let before = favorites.len();
                favorites.retain(|favorite| !favorite.matches(key));
                if favorites.len() != before {
                    return (true, false);
                }
                favorites.push(Favorite {
                    item_id: key.item_id.clone(),
                    item_type: key.item_type,
                    added_at: now_ms,
                });
                (true, true)
            })
    }

    /// Returns all visits in insertion order.
    pub fn get_visits(&self) -> RepoResult<Vec<Visit>> {
        Ok(self.namespaces.load(Namespace::Visits)?.value)
    }

    pub fn get_visit(&self, key: &ItemKey) -> RepoResult<Option<Visit>> {
        Ok(self
            .get_visits()?
            .into_iter()
            .find(|visit| visit.matches(key)))
    }

    pub fn is_visited(&self, key: &ItemKey) -> RepoResult<bool> {
        Ok(self.get_visit(key)?.is_some())
    }

    /// Records a visit, replacing an existing record for `key` in place.
    pub fn add_visit(&self, key: &ItemKey, memo: Option<String>) -> RepoResult<Visit> {
        let visit = Visit {
            item_id: key.item_id.clone(),
            item_type: key.item_type,
            visited_at: self.clock.now_ms(),
            memo,
        };
        let stored = visit.clone();
        self.namespaces
            .update(Namespace::Visits, |visits: &mut Vec<Visit>| {
                match visits.iter_mut().find(|existing| existing.matches(key)) {
                    Some(existing) => *existing = stored,
                    None => visits.push(stored),
                }
                (true, ())
            })?;
        info!(
            "event=visit_add module=repo status=ok item_type={} has_memo={}",
            key.item_type,
            visit.memo.is_some()
        );
        Ok(visit)
    }

    /// Removes the visit for `key`. Returns `true` when one was removed.
    pub fn remove_visit(&self, key: &ItemKey) -> RepoResult<bool> {
        self.namespaces
            .update(Namespace::Visits, |visits: &mut Vec<Visit>| {
                let before = visits.len();
                visits.retain(|visit| !visit.matches(key));
                let removed = visits.len() != before;
                (removed, removed)
            })
    }

    /// Flips visited state in one write. Returns the new state.
    pub fn toggle_visit(&self, key: &ItemKey) -> RepoResult<bool> {
        let now_ms = self.clock.now_ms();
        self.namespaces
            .update(Namespace::Visits, |visits: &mut Vec<Visit>| {
                let before = visits.len();
                visits.retain(|visit| !visit.matches(key));
                if visits.len() != before {
                    return (true, false);
                }
                visits.push(Visit {
                    item_id: key.item_id.clone(),
                    item_type: key.item_type,
                    visited_at: now_ms,
                    memo: None,
                });
                (true, true)
            })
    }

    /// Counts persisted records across namespaces.
    pub fn stats(&self) -> RepoResult<UserDataStats> {
        let favorites = self.get_favorites()?;
        let visits = self.get_visits()?;
        let plans: Vec<Plan> = self.namespaces.load(Namespace::Plans)?.value;

        let visited = |kind: ItemType| visits.iter().filter(|v| v.item_type == kind).count();
        Ok(UserDataStats {
            total_favorites: favorites.len(),
            total_visits: visits.len(),
            total_plans: plans.len(),
            visited_sights: visited(ItemType::Sight),
            visited_souvenirs: visited(ItemType::Souvenir),
        })
    }

    pub fn is_onboarding_completed(&self) -> RepoResult<bool> {
        Ok(self.namespaces.load::<bool>(Namespace::Onboarding)?.value)
    }

    pub fn complete_onboarding(&self) -> RepoResult<()> {
        self.namespaces
            .update(Namespace::Onboarding, |completed: &mut bool| {
                let changed = !*completed;
                *completed = true;
                (changed, ())
            })
    }

    pub fn reset_onboarding(&self) -> RepoResult<()> {
        self.namespaces.remove(Namespace::Onboarding)
    }

    /// Removes every user-data namespace, plans included.
    pub fn clear_all(&self) -> RepoResult<()> {
        for namespace in Namespace::ALL {
            self.namespaces.remove(namespace)?;
        }
        info!("event=user_data_clear module=repo status=ok");
        Ok(())
    }
}

//! Favorites/visits query service.
//!
//! # Responsibility
//! - Answer membership questions for list and detail screens.
//! - Join favorites against catalog data for the favorites screen.
//!
//! # Invariants
//! - `UserDataIndex` lookups are O(1) after one O(n) build.
//! - Favorites whose catalog entry is gone are skipped, not errors.

use crate::catalog::CatalogIndex;
use crate::clock::Clock;
use crate::model::catalog::{ItemKey, ItemType};
use crate::model::user_data::{Favorite, Visit};
use crate::repo::user_data_repo::UserDataRepository;
use crate::repo::RepoResult;
use crate::store::KeyValueStore;
use std::collections::{HashMap, HashSet};

/// Point-in-time hash index over favorites and visits.
#[derive(Debug, Clone, Default)]
pub struct UserDataIndex {
    favorites: HashSet<ItemKey>,
    visits: HashMap<ItemKey, Visit>,
}

impl UserDataIndex {
    pub fn new(favorites: &[Favorite], visits: &[Visit]) -> Self {
        Self {
            favorites: favorites.iter().map(Favorite::key).collect(),
            visits: visits
                .iter()
                .map(|visit| (visit.key(), visit.clone()))
                .collect(),
        }
    }

    pub fn is_favorite(&self, key: &ItemKey) -> bool {
        self.favorites.contains(key)
    }

    pub fn is_visited(&self, key: &ItemKey) -> bool {
        self.visits.contains_key(key)
    }

    pub fn get_visit(&self, key: &ItemKey) -> Option<&Visit> {
        self.visits.get(key)
    }
}

/// Favorite joined with catalog display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteItem {
    pub id: String,
    pub name: String,
    pub name_kana: String,
    pub description: String,
    pub item_type: ItemType,
    pub added_at: i64,
}

/// Joins favorites to catalog entries, keeping favorite order.
pub fn map_favorites_to_items(
    favorites: &[Favorite],
    catalog: &CatalogIndex<'_>,
) -> Vec<FavoriteItem> {
    favorites
        .iter()
        .filter_map(|favorite| {
            let item = catalog.get(&favorite.key())?;
            Some(FavoriteItem {
                id: item.id().to_string(),
                name: item.name().to_string(),
                name_kana: item.name_kana().to_string(),
                description: item.description().to_string(),
                item_type: favorite.item_type,
                added_at: favorite.added_at,
            })
        })
        .collect()
}

/// Use-case wrapper for favorite/visit reads and toggles.
pub struct QueryService<S: KeyValueStore, C: Clock> {
    repo: UserDataRepository<S, C>,
}

impl<S: KeyValueStore, C: Clock> QueryService<S, C> {
    pub fn new(repo: UserDataRepository<S, C>) -> Self {
        Self { repo }
    }

    /// Underlying repository for full CRUD access.
    pub fn repo(&self) -> &UserDataRepository<S, C> {
        &self.repo
    }

    /// Loads favorites and visits once and indexes them.
    pub fn index(&self) -> RepoResult<UserDataIndex> {
        let favorites = self.repo.get_favorites()?;
        let visits = self.repo.get_visits()?;
        Ok(UserDataIndex::new(&favorites, &visits))
    }

    pub fn is_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        self.repo.is_favorite(key)
    }

    pub fn is_visited(&self, key: &ItemKey) -> RepoResult<bool> {
        self.repo.is_visited(key)
    }

    pub fn get_visit(&self, key: &ItemKey) -> RepoResult<Option<Visit>> {
        self.repo.get_visit(key)
    }

    pub fn toggle_favorite(&self, key: &ItemKey) -> RepoResult<bool> {
        self.repo.toggle_favorite(key)
    }

    pub fn toggle_visit(&self, key: &ItemKey) -> RepoResult<bool> {
        self.repo.toggle_visit(key)
    }

    /// Favorites with catalog display data, in insertion order.
    pub fn favorite_items(&self, catalog: &CatalogIndex<'_>) -> RepoResult<Vec<FavoriteItem>> {
        let favorites = self.repo.get_favorites()?;
        Ok(map_favorites_to_items(&favorites, catalog))
    }
}

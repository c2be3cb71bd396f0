//! Recommendation selector for the discover screen.
//!
//! # Responsibility
//! - Pick a few suggestions across both catalogs, biased toward items the
//!   user favorited but has not visited yet.
//!
//! # Invariants
//! - Pure: reads catalogs and history, never writes user data.
//! - Pool priority is `favorite_unvisited` > `unvisited` > `all`.
//! - Results never contain the same `(id, type)` twice.
//! - Empty catalogs yield an empty result.

use crate::catalog::Catalog;
use crate::model::catalog::{CatalogItem, ItemKey, ItemType};
use crate::model::user_data::{Favorite, Visit};
use crate::service::query_service::UserDataIndex;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Number of suggestions shown on the discover screen.
pub const SUGGESTION_COUNT: usize = 3;

/// Why an item was suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    /// Favorited and not yet visited.
    Favorite,
    /// Not yet visited.
    Unvisited,
    /// Padding or fallback pick.
    Random,
}

/// One suggestion with the display fields the card needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub item_type: ItemType,
    pub name: String,
    pub name_kana: String,
    pub description: String,
    pub photo_path: Option<String>,
    pub address: Option<String>,
    pub price: Option<String>,
    pub reason: SuggestionReason,
    pub is_favorite: bool,
    pub is_visited: bool,
}

impl Suggestion {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id.as_str(), self.item_type)
    }

    pub fn route_path(&self) -> String {
        self.key().route_path()
    }

    fn from_item(item: CatalogItem<'_>, reason: SuggestionReason, index: &UserDataIndex) -> Self {
        let key = item.key();
        let (photo_path, address, price) = match item {
            CatalogItem::Sight(sight) => (
                sight.photo_path(),
                sight.address.clone(),
                sight.price.clone(),
            ),
            CatalogItem::Souvenir(_) => (None, None, None),
        };
        Self {
            id: key.item_id.clone(),
            item_type: key.item_type,
            name: item.name().to_string(),
            name_kana: item.name_kana().to_string(),
            description: item.description().to_string(),
            photo_path,
            address,
            price,
            reason,
            is_favorite: index.is_favorite(&key),
            is_visited: index.is_visited(&key),
        }
    }
}

/// Priority tiers computed for one catalog + history pair.
struct Tiers<'a> {
    all: Vec<CatalogItem<'a>>,
    favorite_unvisited: Vec<CatalogItem<'a>>,
    unvisited: Vec<CatalogItem<'a>>,
    favorite_unvisited_keys: HashSet<ItemKey>,
    index: UserDataIndex,
}

impl<'a> Tiers<'a> {
    fn new(catalog: &'a Catalog, favorites: &[Favorite], visits: &[Visit]) -> Self {
        let index = UserDataIndex::new(favorites, visits);

        let mut seen = HashSet::new();
        let all: Vec<CatalogItem<'a>> = catalog
            .items()
            .filter(|item| seen.insert(item.key()))
            .collect();

        let unvisited: Vec<CatalogItem<'a>> = all
            .iter()
            .copied()
            .filter(|item| !index.is_visited(&item.key()))
            .collect();
        let favorite_unvisited: Vec<CatalogItem<'a>> = unvisited
            .iter()
            .copied()
            .filter(|item| index.is_favorite(&item.key()))
            .collect();
        let favorite_unvisited_keys = favorite_unvisited.iter().map(CatalogItem::key).collect();

        Self {
            all,
            favorite_unvisited,
            unvisited,
            favorite_unvisited_keys,
            index,
        }
    }

    fn priority_pool(&self) -> &[CatalogItem<'a>] {
        if !self.favorite_unvisited.is_empty() {
            &self.favorite_unvisited
        } else if !self.unvisited.is_empty() {
            &self.unvisited
        } else {
            &self.all
        }
    }

    fn reason_for(&self, item: &CatalogItem<'_>) -> SuggestionReason {
        let key = item.key();
        if self.favorite_unvisited_keys.contains(&key) {
            SuggestionReason::Favorite
        } else if !self.index.is_visited(&key) {
            SuggestionReason::Unvisited
        } else {
            SuggestionReason::Random
        }
    }

    fn suggestion(&self, item: CatalogItem<'_>) -> Suggestion {
        Suggestion::from_item(item, self.reason_for(&item), &self.index)
    }
}

/// Picks up to [`SUGGESTION_COUNT`] suggestions.
pub fn recommend<R: Rng + ?Sized>(
    catalog: &Catalog,
    favorites: &[Favorite],
    visits: &[Visit],
    rng: &mut R,
) -> Vec<Suggestion> {
    recommend_n(catalog, favorites, visits, SUGGESTION_COUNT, rng)
}

/// Picks up to `count` suggestions.
///
/// The priority pool is padded from the rest of the catalog when it holds
/// fewer than `count` items, then shuffled and cut to `count`.
pub fn recommend_n<R: Rng + ?Sized>(
    catalog: &Catalog,
    favorites: &[Favorite],
    visits: &[Visit],
    count: usize,
    rng: &mut R,
) -> Vec<Suggestion> {
    let tiers = Tiers::new(catalog, favorites, visits);
    let mut pool: Vec<CatalogItem<'_>> = tiers.priority_pool().to_vec();

    if pool.len() < count {
        let in_pool: HashSet<ItemKey> = pool.iter().map(CatalogItem::key).collect();
        let remaining: Vec<CatalogItem<'_>> = tiers
            .all
            .iter()
            .copied()
            .filter(|item| !in_pool.contains(&item.key()))
            .collect();
        let needed = count - pool.len();
        pool.extend(remaining.choose_multiple(rng, needed).copied());
    }

    pool.shuffle(rng);
    pool.truncate(count);

    debug!(
        "event=recommend module=service status=ok catalog_size={} favorite_unvisited={} unvisited={} selected={}",
        tiers.all.len(),
        tiers.favorite_unvisited.len(),
        tiers.unvisited.len(),
        pool.len()
    );

    pool.into_iter().map(|item| tiers.suggestion(item)).collect()
}

/// Single-suggestion mode: one uniform pick from the priority pool.
pub fn recommend_one<R: Rng + ?Sized>(
    catalog: &Catalog,
    favorites: &[Favorite],
    visits: &[Visit],
    rng: &mut R,
) -> Option<Suggestion> {
    let tiers = Tiers::new(catalog, favorites, visits);
    let pool = tiers.priority_pool();
    if pool.is_empty() {
        return None;
    }
    let item = pool[rng.gen_range(0..pool.len())];
    Some(tiers.suggestion(item))
}

/// User-facing explanation shown under a suggestion card.
pub fn reason_message(item_type: ItemType, reason: SuggestionReason) -> &'static str {
    match (reason, item_type) {
        (SuggestionReason::Favorite, ItemType::Sight) => {
            "One of your favorites you have not visited yet"
        }
        (SuggestionReason::Favorite, ItemType::Souvenir) => {
            "One of your favorites you have not bought yet"
        }
        (SuggestionReason::Unvisited, ItemType::Sight) => "A place you have not visited yet",
        (SuggestionReason::Unvisited, ItemType::Souvenir) => "A souvenir you have not bought yet",
        (SuggestionReason::Random, ItemType::Sight) => "Discover a new sight",
        (SuggestionReason::Random, ItemType::Souvenir) => "Discover a new souvenir",
    }
}

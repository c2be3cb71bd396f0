//! Read-only sight/souvenir catalogs.
//!
//! # Responsibility
//! - Hold the session catalogs and expose id lookups for joins.
//! - Provide the name search used by list screens.
//!
//! # Invariants
//! - Catalog contents are never mutated after load.
//! - `CatalogIndex` is built once per join, giving O(n + m) join cost.

mod loader;

pub use loader::{
    CatalogError, CatalogLoader, CatalogSource, FileCatalogSource, StaticCatalogSource,
};

use crate::model::catalog::{CatalogItem, ItemKey, ItemType, Sight, Souvenir};
use std::collections::HashMap;

/// Both catalogs for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub sights: Vec<Sight>,
    pub souvenirs: Vec<Souvenir>,
}

impl Catalog {
    pub fn new(sights: Vec<Sight>, souvenirs: Vec<Souvenir>) -> Self {
        Self { sights, souvenirs }
    }

    pub fn is_empty(&self) -> bool {
        self.sights.is_empty() && self.souvenirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sights.len() + self.souvenirs.len()
    }

    /// Sights first, then souvenirs, each in catalog order.
    pub fn items(&self) -> impl Iterator<Item = CatalogItem<'_>> {
        self.sights
            .iter()
            .map(CatalogItem::Sight)
            .chain(self.souvenirs.iter().map(CatalogItem::Souvenir))
    }

    /// Returns a copy restricted to names containing `query`.
    ///
    /// Matches on `name` or `name_kana`. A blank query keeps everything, and
    /// entries without a name are always kept.
    pub fn filter_by_name(&self, query: &str) -> Catalog {
        let query = query.trim();
        if query.is_empty() {
            return self.clone();
        }
        let matches = |name: &str, kana: &str| {
            name.is_empty() || name.contains(query) || kana.contains(query)
        };
        Catalog {
            sights: self
                .sights
                .iter()
                .filter(|sight| matches(&sight.name, &sight.name_kana))
                .cloned()
                .collect(),
            souvenirs: self
                .souvenirs
                .iter()
                .filter(|souvenir| matches(&souvenir.name, &souvenir.name_kana))
                .cloned()
                .collect(),
        }
    }

    pub fn index(&self) -> CatalogIndex<'_> {
        CatalogIndex::new(self)
    }
}

/// Id lookup over both catalogs.
///
/// Duplicate ids within one catalog resolve to the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex<'a> {
    sights: HashMap<&'a str, &'a Sight>,
    souvenirs: HashMap<&'a str, &'a Souvenir>,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        let mut sights = HashMap::with_capacity(catalog.sights.len());
        for sight in &catalog.sights {
            sights.entry(sight.id.as_str()).or_insert(sight);
        }
        let mut souvenirs = HashMap::with_capacity(catalog.souvenirs.len());
        for souvenir in &catalog.souvenirs {
            souvenirs.entry(souvenir.id.as_str()).or_insert(souvenir);
        }
        Self { sights, souvenirs }
    }

    pub fn get(&self, key: &ItemKey) -> Option<CatalogItem<'a>> {
        match key.item_type {
            ItemType::Sight => self
                .sights
                .get(key.item_id.as_str())
                .copied()
                .map(CatalogItem::Sight),
            ItemType::Souvenir => self
                .souvenirs
                .get(key.item_id.as_str())
                .copied()
                .map(CatalogItem::Souvenir),
        }
    }
}

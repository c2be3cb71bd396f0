//! Catalog domain model.
//!
//! # Responsibility
//! - Define the read-only sight/souvenir records loaded from static data.
//! - Provide one tagged identity (`ItemKey`) shared by user data and joins.
//!
//! # Invariants
//! - Catalog records are immutable for the session; core never mutates them.
//! - `(item_id, item_type)` identifies exactly one catalog entry.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Discriminant for the two catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Sightseeing spot.
    Sight,
    /// Local souvenir product.
    Souvenir,
}

impl ItemType {
    /// Stable lowercase label used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sight => "sight",
            Self::Souvenir => "souvenir",
        }
    }

    /// Parses the stable label produced by [`ItemType::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sight" => Some(Self::Sight),
            "souvenir" => Some(Self::Souvenir),
            _ => None,
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one catalog item across both catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub item_id: String,
    pub item_type: ItemType,
}

impl ItemKey {
    pub fn new(item_id: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            item_id: item_id.into(),
            item_type,
        }
    }

    pub fn sight(item_id: impl Into<String>) -> Self {
        Self::new(item_id, ItemType::Sight)
    }

    pub fn souvenir(item_id: impl Into<String>) -> Self {
        Self::new(item_id, ItemType::Souvenir)
    }

    /// Detail page path for the view layer.
    ///
    /// Sights and souvenirs live under separate routes.
    pub fn route_path(&self) -> String {
        match self.item_type {
            ItemType::Sight => format!("/sights/{}", self.item_id),
            ItemType::Souvenir => format!("/souvenir/{}", self.item_id),
        }
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.item_type, self.item_id)
    }
}

/// Sightseeing spot record.
///
/// Only `id`, `name`, `name_kana` and `description` are guaranteed; the rest
/// mirror optional columns of the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sight {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_name_kana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Sight {
    /// Creates a sight with only the required text fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Asset path for the sight photo, if one is set.
    pub fn photo_path(&self) -> Option<String> {
        non_blank(self.photo.as_deref()).map(|photo| format!("/assets/{photo}"))
    }
}

/// Souvenir product record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Souvenir {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub description: String,
}

impl Souvenir {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            name_kana: String::new(),
            description: description.into(),
        }
    }
}

/// Borrowed view over either catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogItem<'a> {
    Sight(&'a Sight),
    Souvenir(&'a Souvenir),
}

impl<'a> CatalogItem<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Self::Sight(sight) => sight.id.as_str(),
            Self::Souvenir(souvenir) => souvenir.id.as_str(),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Sight(sight) => sight.name.as_str(),
            Self::Souvenir(souvenir) => souvenir.name.as_str(),
        }
    }

    pub fn name_kana(&self) -> &'a str {
        match self {
            Self::Sight(sight) => sight.name_kana.as_str(),
            Self::Souvenir(souvenir) => souvenir.name_kana.as_str(),
        }
    }

    pub fn description(&self) -> &'a str {
        match self {
            Self::Sight(sight) => sight.description.as_str(),
            Self::Souvenir(souvenir) => souvenir.description.as_str(),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Sight(_) => ItemType::Sight,
            Self::Souvenir(_) => ItemType::Souvenir,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id(), self.item_type())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{CatalogItem, ItemKey, ItemType, Sight, Souvenir};

    #[test]
    fn item_type_labels_roundtrip() {
        for kind in [ItemType::Sight, ItemType::Souvenir] {
            assert_eq!(ItemType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemType::parse(" Souvenir "), Some(ItemType::Souvenir));
        assert_eq!(ItemType::parse("hotel"), None);
    }

    #[test]
    fn route_path_depends_on_item_type() {
        assert_eq!(ItemKey::sight("s-1").route_path(), "/sights/s-1");
        assert_eq!(ItemKey::souvenir("v-9").route_path(), "/souvenir/v-9");
    }

    #[test]
    fn sight_deserializes_with_missing_optional_fields() {
        let sight: Sight = serde_json::from_str(
            r#"{"id":"1","name":"Kinkaku-ji","name_kana":"きんかくじ","description":"Golden pavilion"}"#,
        )
        .expect("minimal sight should parse");
        assert_eq!(sight.id, "1");
        assert!(sight.address.is_none());
        assert!(sight.photo_path().is_none());
    }

    #[test]
    fn photo_path_ignores_blank_values() {
        let mut sight = Sight::new("1", "Kinkaku-ji", "");
        sight.photo = Some("  ".to_string());
        assert!(sight.photo_path().is_none());

        sight.photo = Some("photos/kinkaku.jpg".to_string());
        assert_eq!(
            sight.photo_path().as_deref(),
            Some("/assets/photos/kinkaku.jpg")
        );
    }

    #[test]
    fn catalog_item_exposes_key_for_both_variants() {
        let sight = Sight::new("a", "A", "");
        let souvenir = Souvenir::new("a", "Yatsuhashi", "");

        assert_eq!(CatalogItem::Sight(&sight).key(), ItemKey::sight("a"));
        assert_eq!(
            CatalogItem::Souvenir(&souvenir).key(),
            ItemKey::souvenir("a")
        );
        assert_eq!(CatalogItem::Souvenir(&souvenir).name(), "Yatsuhashi");
    }
}

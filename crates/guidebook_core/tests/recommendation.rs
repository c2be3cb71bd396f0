use guidebook_core::service::recommend::recommend_n;
use guidebook_core::{
    recommend, Catalog, Favorite, ItemKey, ItemType, Sight, Souvenir, SuggestionReason, Visit,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn favorite(key: &ItemKey) -> Favorite {
    Favorite {
        item_id: key.item_id.clone(),
        item_type: key.item_type,
        added_at: 0,
    }
}

fn visit(key: &ItemKey) -> Visit {
    Visit {
        item_id: key.item_id.clone(),
        item_type: key.item_type,
        visited_at: 0,
        memo: None,
    }
}

fn sights(ids: &[&str]) -> Vec<Sight> {
    ids.iter()
        .map(|id| Sight::new(*id, format!("Sight {id}"), "description"))
        .collect()
}

#[test]
fn favorite_unvisited_items_are_always_suggested_first() {
    let catalog = Catalog::new(sights(&["A", "B", "C"]), Vec::new());
    let favorites = vec![favorite(&ItemKey::sight("A"))];
    let visits = vec![visit(&ItemKey::sight("B"))];

    for seed in 0..50 {
        let result = recommend(
            &catalog,
            &favorites,
            &visits,
            &mut StdRng::seed_from_u64(seed),
        );
        assert_eq!(result.len(), 3);

        let keys: HashSet<ItemKey> = result.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), 3);

        let a = result.iter().find(|s| s.id == "A").unwrap();
        assert_eq!(a.reason, SuggestionReason::Favorite);
        assert!(a.is_favorite);
        let b = result.iter().find(|s| s.id == "B").unwrap();
        assert_eq!(b.reason, SuggestionReason::Random);
        assert!(b.is_visited);
        let c = result.iter().find(|s| s.id == "C").unwrap();
        assert_eq!(c.reason, SuggestionReason::Unvisited);
    }
}

#[test]
fn unvisited_pool_is_padded_with_visited_item() {
    let catalog = Catalog::new(sights(&["A", "B", "C"]), Vec::new());
    let visits = vec![visit(&ItemKey::sight("A"))];

    for seed in 0..50 {
        let result = recommend(&catalog, &[], &visits, &mut StdRng::seed_from_u64(seed));
        assert_eq!(result.len(), 3);
        for suggestion in &result {
            let expected = if suggestion.id == "A" {
                SuggestionReason::Random
            } else {
                SuggestionReason::Unvisited
            };
            assert_eq!(suggestion.reason, expected, "item {}", suggestion.id);
        }
        let ids: HashSet<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["A", "B", "C"]));
    }
}

#[test]
fn two_favorites_are_always_included() {
    let catalog = Catalog::new(sights(&["1", "2", "3", "4", "5"]), Vec::new());
    let favorites = vec![favorite(&ItemKey::sight("2")), favorite(&ItemKey::sight("4"))];
    let visits = vec![visit(&ItemKey::sight("1"))];

    for seed in 0..50 {
        let result = recommend(
            &catalog,
            &favorites,
            &visits,
            &mut StdRng::seed_from_u64(seed),
        );
        assert_eq!(result.len(), 3);
        let favored: Vec<&str> = result
            .iter()
            .filter(|s| s.reason == SuggestionReason::Favorite)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(favored.len(), 2);
        assert!(favored.contains(&"2") && favored.contains(&"4"));
    }
}

#[test]
fn large_favorite_pool_excludes_other_items() {
    let catalog = Catalog::new(
        sights(&["1", "2", "3", "4", "5", "6"]),
        vec![Souvenir::new("1", "Matcha", ""), Souvenir::new("2", "Fan", "")],
    );
    let favorites: Vec<Favorite> = [
        ItemKey::sight("1"),
        ItemKey::sight("2"),
        ItemKey::souvenir("1"),
        ItemKey::souvenir("2"),
    ]
    .iter()
    .map(favorite)
    .collect();
    let visits = vec![visit(&ItemKey::souvenir("2")), visit(&ItemKey::sight("3"))];

    for seed in 0..50 {
        let result = recommend(
            &catalog,
            &favorites,
            &visits,
            &mut StdRng::seed_from_u64(seed),
        );
        assert_eq!(result.len(), 3);
        for suggestion in &result {
            assert_eq!(suggestion.reason, SuggestionReason::Favorite);
            assert!(!suggestion.is_visited);
        }
    }
}

#[test]
fn all_visited_falls_back_to_whole_catalog() {
    let catalog = Catalog::new(sights(&["a", "b"]), vec![Souvenir::new("c", "Tea", "")]);
    let visits: Vec<Visit> = catalog.items().map(|item| visit(&item.key())).collect();

    let result = recommend(&catalog, &[], &visits, &mut StdRng::seed_from_u64(11));
    assert_eq!(result.len(), 3);
    assert!(result
        .iter()
        .all(|s| s.reason == SuggestionReason::Random && s.is_visited));
}

#[test]
fn small_catalogs_return_every_item_once() {
    let catalog = Catalog::new(sights(&["only"]), vec![Souvenir::new("only", "Sake", "")]);
    let result = recommend(&catalog, &[], &[], &mut StdRng::seed_from_u64(0));

    assert_eq!(result.len(), 2);
    let types: HashSet<ItemType> = result.iter().map(|s| s.item_type).collect();
    assert_eq!(types.len(), 2);
    assert!(result.iter().any(|s| s.route_path() == "/souvenir/only"));
    assert!(result.iter().any(|s| s.route_path() == "/sights/only"));
}

#[test]
fn custom_count_is_honored() {
    let ids: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let catalog = Catalog::new(sights(&refs), Vec::new());

    let result = recommend_n(&catalog, &[], &[], 5, &mut StdRng::seed_from_u64(4));
    assert_eq!(result.len(), 5);
    let keys: HashSet<ItemKey> = result.iter().map(|s| s.key()).collect();
    assert_eq!(keys.len(), 5);
}

#[test]
fn suggestions_expose_sight_photo_paths() {
    let mut sight = Sight::new("p", "Heian Shrine", "");
    sight.photo = Some("heian.jpg".to_string());
    let catalog = Catalog::new(vec![sight], Vec::new());

    let result = recommend(&catalog, &[], &[], &mut StdRng::seed_from_u64(1));
    assert_eq!(result[0].photo_path.as_deref(), Some("/assets/heian.jpg"));
}

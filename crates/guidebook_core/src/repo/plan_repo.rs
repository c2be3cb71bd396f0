//! Plan repository.
//!
//! # Responsibility
//! - Provide CRUD for itinerary plans and their ordered items.
//!
//! # Invariants
//! - Item `order` values are `0..n-1` in array order after every mutation.
//! - One `(item_id, item_type)` appears at most once per plan.
//! - Unknown plan ids degrade to `None`/`false`, never to errors.
//! - Every item mutation bumps `updated_at`.

use crate::clock::Clock;
use crate::model::catalog::ItemKey;
use crate::model::user_data::{normalize_plan_items, Plan, PlanId, PlanItem, PlanUpdate};
use crate::repo::namespace::{Namespace, NamespaceStore};
use crate::repo::RepoResult;
use crate::store::KeyValueStore;
use log::info;

/// Repository for itinerary plans.
pub struct PlanRepository<S: KeyValueStore, C: Clock> {
    namespaces: NamespaceStore<S>,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> PlanRepository<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            namespaces: NamespaceStore::new(store),
            clock,
        }
    }

    /// Returns all plans in creation order.
    pub fn get_plans(&self) -> RepoResult<Vec<Plan>> {
        Ok(self.namespaces.load(Namespace::Plans)?.value)
    }

    pub fn get_plan(&self, id: PlanId) -> RepoResult<Option<Plan>> {
        Ok(self.get_plans()?.into_iter().find(|plan| plan.id == id))
    }

    /// Creates an empty plan with a fresh id.
    pub fn create_plan(&self, name: &str) -> RepoResult<Plan> {
        self.create_plan_with_items(name, Vec::new())
    }

    /// Creates a plan already holding `items`, in one write.
    ///
    /// Items are normalized like any other plan mutation.
    pub fn create_plan_with_items(&self, name: &str, items: Vec<PlanItem>) -> RepoResult<Plan> {
        let mut plan = Plan::new(name, self.clock.now_ms());
        plan.items = normalize_plan_items(items);
        let stored = plan.clone();
        self.namespaces
            .update(Namespace::Plans, |plans: &mut Vec<Plan>| {
                plans.push(stored);
                (true, ())
            })?;
        info!(
            "event=plan_create module=repo status=ok plan_id={} items={}",
            plan.id,
            plan.items.len()
        );
        Ok(plan)
    }

    /// Merges provided fields into one plan and bumps `updated_at`.
    pub fn update_plan(&self, id: PlanId, update: PlanUpdate) -> RepoResult<Option<Plan>> {
        self.modify_plan(id, |plan| {
            if let Some(name) = update.name {
                plan.name = name;
            }
            if let Some(items) = update.items {
                plan.items = items;
            }
            true
        })
    }

    /// Deletes one plan. Returns `true` when it existed.
    pub fn delete_plan(&self, id: PlanId) -> RepoResult<bool> {
        let deleted = self
            .namespaces
            .update(Namespace::Plans, |plans: &mut Vec<Plan>| {
                let before = plans.len();
                plans.retain(|plan| plan.id != id);
                let deleted = plans.len() != before;
                (deleted, deleted)
            })?;
        if deleted {
            info!("event=plan_delete module=repo status=ok plan_id={id}");
        }
        Ok(deleted)
    }

    /// Appends one item unless the plan already contains it.
    pub fn add_item_to_plan(&self, id: PlanId, key: &ItemKey) -> RepoResult<Option<Plan>> {
        self.modify_plan(id, |plan| {
            if plan.contains(key) {
                return false;
            }
            plan.items.push(PlanItem::new(key));
            true
        })
    }

    /// Removes one item and closes the order gap.
    pub fn remove_item_from_plan(&self, id: PlanId, key: &ItemKey) -> RepoResult<Option<Plan>> {
        self.modify_plan(id, |plan| {
            let before = plan.items.len();
            plan.items.retain(|item| !item.matches(key));
            plan.items.len() != before
        })
    }

    /// Replaces item order with the caller's sequence.
    ///
    /// Incoming `order` values are ignored; array position is authoritative.
    pub fn reorder_plan_items(
        &self,
        id: PlanId,
        items: Vec<PlanItem>,
    ) -> RepoResult<Option<Plan>> {
        self.modify_plan(id, |plan| {
            plan.items = items;
            true
        })
    }

    pub fn is_item_in_plan(&self, id: PlanId, key: &ItemKey) -> RepoResult<bool> {
        Ok(self
            .get_plan(id)?
            .map(|plan| plan.contains(key))
            .unwrap_or(false))
    }

    /// Applies `mutate` to one plan; on change renormalizes items, bumps
    /// `updated_at` and commits.
    ///
    /// Returns the resulting plan, or `None` when `id` is unknown.
    fn modify_plan(
        &self,
        id: PlanId,
        mutate: impl FnOnce(&mut Plan) -> bool,
    ) -> RepoResult<Option<Plan>> {
        let now_ms = self.clock.now_ms();
        self.namespaces
            .update(Namespace::Plans, |plans: &mut Vec<Plan>| {
                let Some(plan) = plans.iter_mut().find(|plan| plan.id == id) else {
                    return (false, None);
                };
                if !mutate(plan) {
                    return (false, Some(plan.clone()));
                }
                plan.items = normalize_plan_items(std::mem::take(&mut plan.items));
                plan.updated_at = now_ms.max(plan.created_at);
                (true, Some(plan.clone()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::PlanRepository;
    use crate::clock::ManualClock;
    use crate::model::catalog::ItemKey;
    use crate::store::MemoryKvStore;
    use uuid::Uuid;

    #[test]
    fn unknown_plan_degrades_to_none() {
        let store = MemoryKvStore::new();
        let repo = PlanRepository::new(&store, ManualClock::new(0));
        let missing = Uuid::new_v4();

        assert!(repo.get_plan(missing).unwrap().is_none());
        assert!(repo
            .add_item_to_plan(missing, &ItemKey::sight("a"))
            .unwrap()
            .is_none());
        assert!(!repo.is_item_in_plan(missing, &ItemKey::sight("a")).unwrap());
        assert!(!repo.delete_plan(missing).unwrap());
    }

    #[test]
    fn adding_existing_item_keeps_updated_at() {
        let store = MemoryKvStore::new();
        let repo = PlanRepository::new(&store, ManualClock::new(100));
        let plan = repo.create_plan("Gion walk").unwrap();

        let first = repo
            .add_item_to_plan(plan.id, &ItemKey::sight("yasaka"))
            .unwrap()
            .unwrap();
        let second = repo
            .add_item_to_plan(plan.id, &ItemKey::sight("yasaka"))
            .unwrap()
            .unwrap();

        assert_eq!(second.items.len(), 1);
        assert_eq!(first.updated_at, second.updated_at);
        assert!(first.updated_at > plan.created_at);
    }
}

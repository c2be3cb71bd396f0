//! Plan use-case service.
//!
//! # Responsibility
//! - Validate plan names above the repository layer.
//! - Resolve plan items against catalogs for the plan detail screen.
//! - Build quick random plans from the sight catalog.
//!
//! # Invariants
//! - Stored plan names are trimmed and never blank.
//! - Mutations on unknown plan ids fail with `PlanNotFound`.

use crate::catalog::{Catalog, CatalogIndex};
use crate::clock::Clock;
use crate::model::catalog::{CatalogItem, ItemKey, ItemType};
use crate::model::user_data::{Plan, PlanId, PlanItem, PlanUpdate, Visit};
use crate::repo::plan_repo::PlanRepository;
use crate::repo::RepoError;
use crate::store::KeyValueStore;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from plan service operations.
#[derive(Debug)]
pub enum PlanServiceError {
    /// Plan name is blank after trim.
    InvalidName,
    /// Target plan does not exist.
    PlanNotFound(PlanId),
    /// No sights to build a plan from.
    EmptyCatalog,
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for PlanServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "plan name must not be blank"),
            Self::PlanNotFound(id) => write!(f, "plan not found: {id}"),
            Self::EmptyCatalog => write!(f, "sight catalog is empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlanServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PlanServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type PlanServiceResult<T> = Result<T, PlanServiceError>;

/// Plan item resolved against catalog display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDetailItem {
    pub id: String,
    pub item_type: ItemType,
    pub order: u32,
    pub name: String,
    pub description: String,
    pub photo_path: Option<String>,
}

impl PlanDetailItem {
    pub fn route_path(&self) -> String {
        ItemKey::new(self.id.as_str(), self.item_type).route_path()
    }
}

/// Plan with its items resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDetail {
    pub plan: Plan,
    pub items: Vec<PlanDetailItem>,
}

/// Plan service facade.
pub struct PlanService<S: KeyValueStore, C: Clock> {
    repo: PlanRepository<S, C>,
}

impl<S: KeyValueStore, C: Clock> PlanService<S, C> {
    pub fn new(repo: PlanRepository<S, C>) -> Self {
        Self { repo }
    }

    pub fn create_plan(&self, name: impl Into<String>) -> PlanServiceResult<Plan> {
        let name = normalize_plan_name(name.into())?;
        Ok(self.repo.create_plan(name.as_str())?)
    }

    pub fn rename_plan(&self, id: PlanId, name: impl Into<String>) -> PlanServiceResult<Plan> {
        let name = normalize_plan_name(name.into())?;
        let update = PlanUpdate {
            name: Some(name),
            items: None,
        };
        self.repo
            .update_plan(id, update)?
            .ok_or(PlanServiceError::PlanNotFound(id))
    }

    pub fn delete_plan(&self, id: PlanId) -> PlanServiceResult<()> {
        if self.repo.delete_plan(id)? {
            Ok(())
        } else {
            Err(PlanServiceError::PlanNotFound(id))
        }
    }

    pub fn list_plans(&self) -> PlanServiceResult<Vec<Plan>> {
        Ok(self.repo.get_plans()?)
    }

    pub fn get_plan(&self, id: PlanId) -> PlanServiceResult<Option<Plan>> {
        Ok(self.repo.get_plan(id)?)
    }

    pub fn add_item(&self, id: PlanId, key: &ItemKey) -> PlanServiceResult<Plan> {
        self.repo
            .add_item_to_plan(id, key)?
            .ok_or(PlanServiceError::PlanNotFound(id))
    }

    pub fn remove_item(&self, id: PlanId, key: &ItemKey) -> PlanServiceResult<Plan> {
        self.repo
            .remove_item_from_plan(id, key)?
            .ok_or(PlanServiceError::PlanNotFound(id))
    }

    pub fn reorder_items(&self, id: PlanId, items: Vec<PlanItem>) -> PlanServiceResult<Plan> {
        self.repo
            .reorder_plan_items(id, items)?
            .ok_or(PlanServiceError::PlanNotFound(id))
    }

    pub fn is_item_in_plan(&self, id: PlanId, key: &ItemKey) -> PlanServiceResult<bool> {
        Ok(self.repo.is_item_in_plan(id, key)?)
    }

    /// Loads one plan with items joined to the catalog.
    pub fn plan_details(
        &self,
        id: PlanId,
        catalog: &CatalogIndex<'_>,
    ) -> PlanServiceResult<Option<PlanDetail>> {
        Ok(self
            .repo
            .get_plan(id)?
            .map(|plan| resolve_plan(plan, catalog)))
    }

    /// Creates a plan of up to `count` random sights.
    ///
    /// Sights come from the unvisited ones while any remain, otherwise from
    /// the whole catalog. The plan is stored in a single write.
    pub fn create_random_plan<R: Rng + ?Sized>(
        &self,
        name: &str,
        count: usize,
        catalog: &Catalog,
        visits: &[Visit],
        rng: &mut R,
    ) -> PlanServiceResult<Plan> {
        let picks = pick_random_sights(catalog, visits, count, rng);
        if picks.is_empty() {
            return Err(PlanServiceError::EmptyCatalog);
        }
        let name = match normalize_plan_name(name.to_string()) {
            Ok(name) => name,
            Err(_) => format!("Random {}-stop plan", picks.len()),
        };

        let items = picks.iter().map(PlanItem::new).collect();
        let plan = self.repo.create_plan_with_items(name.as_str(), items)?;
        info!(
            "event=plan_random module=service status=ok plan_id={} items={}",
            plan.id,
            plan.items.len()
        );
        Ok(plan)
    }
}

fn normalize_plan_name(name: String) -> PlanServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlanServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn resolve_plan(plan: Plan, catalog: &CatalogIndex<'_>) -> PlanDetail {
    let mut ordered: Vec<&PlanItem> = plan.items.iter().collect();
    ordered.sort_by_key(|item| item.order);
    let items = ordered
        .into_iter()
        .filter_map(|item| {
            let entry = catalog.get(&item.key())?;
            let photo_path = match entry {
                CatalogItem::Sight(sight) => sight.photo_path(),
                CatalogItem::Souvenir(_) => None,
            };
            Some(PlanDetailItem {
                id: item.item_id.clone(),
                item_type: item.item_type,
                order: item.order,
                name: entry.name().to_string(),
                description: entry.description().to_string(),
                photo_path,
            })
        })
        .collect();
    PlanDetail { plan, items }
}

/// Up to `count` distinct sights in random order, drawn from the unvisited
/// sights when any exist and from all sights otherwise.
fn pick_random_sights<R: Rng + ?Sized>(
    catalog: &Catalog,
    visits: &[Visit],
    count: usize,
    rng: &mut R,
) -> Vec<ItemKey> {
    let visited: HashSet<ItemKey> = visits.iter().map(Visit::key).collect();
    let mut seen = HashSet::new();
    let all: Vec<ItemKey> = catalog
        .sights
        .iter()
        .map(|sight| ItemKey::sight(sight.id.as_str()))
        .filter(|key| seen.insert(key.clone()))
        .collect();
    let unvisited: Vec<ItemKey> = all
        .iter()
        .filter(|key| !visited.contains(*key))
        .cloned()
        .collect();
    let pool = if unvisited.is_empty() { &all } else { &unvisited };
    pool.choose_multiple(rng, count).cloned().collect()
}

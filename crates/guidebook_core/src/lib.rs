//! Core user-data and recommendation logic for the Kyoto guidebook.
//! This crate is the single source of truth for favorites, visits and plans.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod text;

pub use catalog::{Catalog, CatalogError, CatalogIndex, CatalogLoader, FileCatalogSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogLevel,
    LoggingError,
};
pub use model::catalog::{CatalogItem, ItemKey, ItemType, Sight, Souvenir};
pub use model::user_data::{Favorite, Plan, PlanId, PlanItem, PlanUpdate, UserDataStats, Visit};
pub use repo::plan_repo::PlanRepository;
pub use repo::user_data_repo::UserDataRepository;
pub use repo::{RepoError, RepoResult};
pub use service::plan_service::{PlanService, PlanServiceError};
pub use service::query_service::{QueryService, UserDataIndex};
pub use service::recommend::{recommend, recommend_one, Suggestion, SuggestionReason};
pub use store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Domain model for catalog items and persisted user data.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep catalog identity (`ItemKey`) shared between user data and joins.
//!
//! # Invariants
//! - Catalog records are read-only; user data references them by key only.
//! - Sight/souvenir branching is expressed through `ItemType` matches.

pub mod catalog;
pub mod user_data;

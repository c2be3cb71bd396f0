//! Use-case services over repositories and catalogs.
//!
//! # Responsibility
//! - Orchestrate repository calls into screen-level APIs.
//! - Keep UI and CLI layers decoupled from storage details.

pub mod plan_service;
pub mod query_service;
pub mod recommend;

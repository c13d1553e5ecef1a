//! Shared building blocks for the HVitOps notifications service.

pub mod config;
pub mod error;
pub mod keys;
pub mod redis_pool;
pub mod store;
pub mod types;

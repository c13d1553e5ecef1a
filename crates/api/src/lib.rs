//! HTTP surface of the notifications service.
//!
//! Endpoints:
//! - GET  /health — liveness probe
//! - POST /notifications — queue a notification
//! - GET  /notifications/:id — status of a delivered notification

pub mod middleware;
pub mod routes;
pub mod state;

//! The `user` REST resource.
//!
//! Layout:
//! - `contract`: plain models shared by every layer
//! - `domain`: service with the request decision rules, repository port, login rule
//! - `infra`: repository implementations
//! - `api::rest`: DTOs, handlers, route registration and error mapping

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersModule;

pub mod config;
pub use config::UsersConfig;

pub const MODULE_NAME: &str = "users";

// === INTERNAL MODULES ===
// Exposed for integration tests and alternative wiring; not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

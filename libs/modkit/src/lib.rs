//! # ModKit - REST toolkit for resource modules
//!
//! Modules build their routers with [`OperationBuilder`], register every
//! operation in a shared [`RouteTable`], and answer with negotiated JSON/XML
//! bodies or RFC 9457 [`Problem`] documents.
//!
//! ```rust,ignore
//! let router = OperationBuilder::<Missing, ()>::get("/api/users/{id}")
//!     .operation_id("users.get_user")
//!     .summary("Get user by ID")
//!     .handler(handlers::get_user)
//!     .register(router, table.as_ref());
//! ```

pub use anyhow::Result;

pub mod api;

pub use api::problem::{
    bad_request, internal_error, not_acceptable, not_found, unprocessable,
    unsupported_media_type, Problem, ProblemResponse,
};
pub use api::{
    Accept, JsonBody, LinkGenerator, Missing, OperationBuilder, PageRequest, PagedList,
    PaginationHeader, Present, ResponseFormat, RouteLinks, RouteRegistry, RouteTable,
    ValidationErrors,
};

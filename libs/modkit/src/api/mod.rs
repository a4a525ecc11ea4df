//! REST building blocks shared by modules
//!
//! - `operation_builder` / `route_table`: type-state route registration and the
//!   record of every mounted operation
//! - `links`: absolute URLs for named operations
//! - `problem` / `validation`: RFC 9457 error bodies and field error maps
//! - `negotiation` / `body`: JSON/XML response selection and optional JSON bodies
//! - `pagination` / `patch`: page-number paging and JSON Patch application

pub mod body;
pub mod links;
pub mod negotiation;
pub mod operation_builder;
pub mod pagination;
pub mod patch;
pub mod problem;
pub mod response;
pub mod route_table;
pub mod validation;

pub use body::JsonBody;
pub use links::{LinkGenerator, RouteLinks};
pub use negotiation::{Accept, ResponseFormat};
pub use operation_builder::{
    state, Missing, OperationBuilder, OperationSpec, Present, RouteRegistry,
};
pub use pagination::{PageRequest, PagedList, PaginationHeader, X_PAGINATION};
pub use patch::{apply_patch, JsonPatch, PatchOperation, Patchable};
pub use route_table::RouteTable;
pub use validation::ValidationErrors;

use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{LinkGenerator, Missing, OperationBuilder, RouteTable};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub const OP_LIST: &str = "users.list";
pub const OP_CREATE: &str = "users.create";
pub const OP_OPTIONS: &str = "users.options";
pub const OP_GET_USER: &str = "users.get_user";
pub const OP_HEAD_USER: &str = "users.head_user";
pub const OP_REPLACE_USER: &str = "users.replace_user";
pub const OP_PATCH_USER: &str = "users.patch_user";
pub const OP_DELETE_USER: &str = "users.delete_user";

/// Mount the users resource under `base_path` and record every operation in `table`.
///
/// Collection operations are registered GET, POST, OPTIONS; that order is the
/// order of the `Allow` header.
pub fn register_routes(
    mut router: Router,
    table: Arc<RouteTable>,
    links: Arc<dyn LinkGenerator>,
    service: Arc<Service>,
    base_path: &str,
) -> Router {
    let base = base_path.trim_end_matches('/').to_owned();
    let item = format!("{base}/{{id}}");
    let registry = table.as_ref();

    // GET {base} - List users
    router = OperationBuilder::<Missing, ()>::get(&base)
        .operation_id(OP_LIST)
        .summary("List users")
        .handler(handlers::list_users)
        .register(router, registry);

    // POST {base} - Create a new user
    router = OperationBuilder::<Missing, ()>::post(&base)
        .operation_id(OP_CREATE)
        .summary("Create a new user")
        .handler(handlers::create_user)
        .register(router, registry);

    // OPTIONS {base} - Supported methods
    router = OperationBuilder::<Missing, ()>::options(&base)
        .operation_id(OP_OPTIONS)
        .summary("Supported methods")
        .handler(handlers::collection_options)
        .register(router, registry);

    // GET {base}/{id} - Get a specific user
    router = OperationBuilder::<Missing, ()>::get(&item)
        .operation_id(OP_GET_USER)
        .summary("Get user by ID")
        .handler(handlers::get_user)
        .register(router, registry);

    // HEAD {base}/{id} - Existence check
    router = OperationBuilder::<Missing, ()>::head(&item)
        .operation_id(OP_HEAD_USER)
        .summary("Check user exists")
        .handler(handlers::head_user)
        .register(router, registry);

    // PUT {base}/{id} - Replace or insert a user
    router = OperationBuilder::<Missing, ()>::put(&item)
        .operation_id(OP_REPLACE_USER)
        .summary("Replace user")
        .handler(handlers::replace_user)
        .register(router, registry);

    // PATCH {base}/{id} - Partial update
    router = OperationBuilder::<Missing, ()>::patch(&item)
        .operation_id(OP_PATCH_USER)
        .summary("Patch user")
        .handler(handlers::patch_user)
        .register(router, registry);

    // DELETE {base}/{id} - Delete a user
    router = OperationBuilder::<Missing, ()>::delete(&item)
        .operation_id(OP_DELETE_USER)
        .summary("Delete user")
        .handler(handlers::delete_user)
        .register(router, registry);

    router
        .layer(Extension(service))
        .layer(Extension(links))
        .layer(Extension(table))
}

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery},
    http::{StatusCode, Uri},
    response::Response,
    Extension,
};
use modkit::api::{
    problem::ProblemResponse, response, Accept, JsonBody, JsonPatch, LinkGenerator,
    PaginationHeader, ResponseFormat, RouteTable, X_PAGINATION,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateUserReq, ListUsersQuery, UpdateUserReq, UserDto, UserListXml, GUID_XML_ROOT,
    USERS_XML_ROOT, USER_XML_ROOT,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::routes::{OP_GET_USER, OP_LIST};
use crate::domain::error::DomainError;
use crate::domain::service::{Service, Upsert};

fn fail(e: DomainError, uri: &Uri) -> ProblemResponse {
    if !matches!(e, DomainError::Repository(_)) {
        debug!("Request rejected: {}", e);
    }
    map_domain_error(&e, uri.path())
}

/// Parse a path identity; `None` when it is not a UUID.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn user_location(links: &dyn LinkGenerator, id: Uuid) -> Result<String, DomainError> {
    Ok(links.link(OP_GET_USER, &[("id", id.to_string())])?)
}

/// 201 with the new identity as body and `Location` pointing at it.
fn created(
    accept: &Accept,
    links: &dyn LinkGenerator,
    id: Uuid,
    uri: &Uri,
) -> Result<Response, ProblemResponse> {
    let location = user_location(links, id).map_err(|e| fail(e, uri))?;
    let resp = accept.respond(StatusCode::CREATED, &id, GUID_XML_ROOT)?;
    response::created_at(resp, &location)
}

/// List users page by page
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    Extension(links): Extension<Arc<dyn LinkGenerator>>,
    accept: Accept,
    RawQuery(raw): RawQuery,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let query = ListUsersQuery::from_raw(raw.as_deref());
    info!("Listing users with query: {:?}", query);

    let request = svc.page_request(query.page_number.as_deref(), query.page_size.as_deref());
    let page = svc.list_users(request).await.map_err(|e| fail(e, &uri))?;

    let pagination = PaginationHeader::for_page(&page, links.as_ref(), OP_LIST)
        .and_then(|h| h.to_header_value())
        .map_err(|e| fail(e.into(), &uri))?;

    let users: Vec<UserDto> = page.items.into_iter().map(UserDto::from).collect();
    let resp = accept.respond_split(
        StatusCode::OK,
        &users,
        &UserListXml { users: &users },
        USERS_XML_ROOT,
    )?;
    Ok(response::with_header(resp, X_PAGINATION, pagination))
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    accept: Accept,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    info!("Getting user with id: {}", id);

    let id = parse_id(&id).ok_or_else(|| fail(DomainError::unknown_id(id), &uri))?;
    let user = svc.get_user(id).await.map_err(|e| fail(e, &uri))?;
    accept.respond(StatusCode::OK, &UserDto::from(user), USER_XML_ROOT)
}

/// Same lookup as GET, headers only
pub async fn head_user(
    Extension(svc): Extension<Arc<Service>>,
    accept: Accept,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    info!("HEAD user with id: {}", id);

    let id = parse_id(&id).ok_or_else(|| fail(DomainError::unknown_id(id), &uri))?;
    svc.get_user(id).await.map_err(|e| fail(e, &uri))?;
    Ok(response::head(
        StatusCode::OK,
        accept.0.unwrap_or(ResponseFormat::Json),
    ))
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(links): Extension<Arc<dyn LinkGenerator>>,
    accept: Accept,
    uri: Uri,
    JsonBody(body): JsonBody<CreateUserReq>,
) -> Result<Response, ProblemResponse> {
    info!("Creating user: {:?}", body);

    let req = body
        .ok_or_else(|| fail(DomainError::bad_request("A request body is required"), &uri))?;
    accept.format()?;

    let user = svc.create_user(req.into()).await.map_err(|e| fail(e, &uri))?;
    created(&accept, links.as_ref(), user.id, &uri)
}

/// Replace a user, inserting it at the given id when absent
pub async fn replace_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(links): Extension<Arc<dyn LinkGenerator>>,
    accept: Accept,
    Path(id): Path<String>,
    uri: Uri,
    JsonBody(body): JsonBody<UpdateUserReq>,
) -> Result<Response, ProblemResponse> {
    info!("Replacing user {} with: {:?}", id, body);

    let req = body
        .ok_or_else(|| fail(DomainError::bad_request("A request body is required"), &uri))?;
    let id = parse_id(&id).ok_or_else(|| {
        fail(
            DomainError::bad_request(format!("'{id}' is not a valid user id")),
            &uri,
        )
    })?;
    accept.format()?;

    match svc.upsert_user(id, req.into()).await {
        Ok(Upsert::Created(user)) => created(&accept, links.as_ref(), user.id, &uri),
        Ok(Upsert::Replaced) => Ok(response::no_content()),
        Err(e) => Err(fail(e, &uri)),
    }
}

/// Apply a JSON Patch document to a user
pub async fn patch_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
    JsonBody(body): JsonBody<JsonPatch>,
) -> Result<Response, ProblemResponse> {
    info!("Patching user with id: {}", id);

    let ops = body.ok_or_else(|| {
        fail(
            DomainError::bad_request("A JSON Patch document is required"),
            &uri,
        )
    })?;
    let id = parse_id(&id).ok_or_else(|| fail(DomainError::unknown_id(id), &uri))?;

    svc.patch_user(id, &ops).await.map_err(|e| fail(e, &uri))?;
    Ok(response::no_content())
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    info!("Deleting user with id: {}", id);

    let id = parse_id(&id).ok_or_else(|| fail(DomainError::unknown_id(id), &uri))?;
    svc.delete_user(id).await.map_err(|e| fail(e, &uri))?;
    Ok(response::no_content())
}

/// Methods supported by the collection
pub async fn collection_options(
    Extension(table): Extension<Arc<RouteTable>>,
) -> Result<Response, ProblemResponse> {
    let path = table.path_for(OP_LIST).unwrap_or_default();
    let allow = table.allow_header(&path);
    debug!(%path, %allow, "Answering OPTIONS");
    response::allow(&allow)
}

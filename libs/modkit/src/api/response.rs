use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::negotiation::ResponseFormat;
use crate::api::problem::{internal_error, ProblemResponse};

/// 204 No Content
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// 200 with an `Allow` header and no body.
pub fn allow(methods: &str) -> Result<Response, ProblemResponse> {
    let value = header_value(methods)?;
    Ok(([(header::ALLOW, value)], StatusCode::OK).into_response())
}

/// Headers-only answer for HEAD requests: status and content type, empty body.
pub fn head(status: StatusCode, format: ResponseFormat) -> Response {
    let mut resp = status.into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    resp
}

/// Turn a rendered body into `201 Created` pointing at `location`.
pub fn created_at(mut resp: Response, location: &str) -> Result<Response, ProblemResponse> {
    let value = header_value(location)?;
    *resp.status_mut() = StatusCode::CREATED;
    resp.headers_mut().insert(header::LOCATION, value);
    Ok(resp)
}

/// Attach an extra header to an already rendered response.
pub fn with_header(mut resp: Response, name: HeaderName, value: HeaderValue) -> Response {
    resp.headers_mut().insert(name, value);
    resp
}

fn header_value(raw: &str) -> Result<HeaderValue, ProblemResponse> {
    HeaderValue::from_str(raw).map_err(|e| {
        tracing::error!(error = %e, value = raw, "Invalid header value");
        internal_error("Failed to build response headers")
    })
}

//! Optional JSON request body.
//!
//! Unlike `axum::Json`, an absent body is not an extraction failure: handlers
//! receive `None` and decide themselves which status a missing body deserves.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde::de::DeserializeOwned;

use crate::api::problem::{bad_request, unsupported_media_type, Problem, ProblemResponse};

/// Decoded request body: `None` for an empty body or the JSON literal `null`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub Option<T>);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

/// Accepts `application/json`, `application/*+json` and a missing content type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(ct) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(ct) = ct.to_str() else {
        return false;
    };
    let mime = ct
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json"
        || mime == "text/json"
        || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decode raw bytes; whitespace-only and `null` bodies yield `None`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, ProblemResponse> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| bad_request(format!("Malformed JSON body: {e}")))?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| bad_request(format!("Request body does not match the expected shape: {e}")))
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = rejection.status();
            ProblemResponse(Problem::new(
                status,
                status.canonical_reason().unwrap_or("Bad Request"),
                rejection.body_text(),
            ))
        })?;

        if !bytes.is_empty() && !is_json_content_type(&headers) {
            return Err(unsupported_media_type("Request body must be JSON"));
        }

        decode_json(&bytes).map(JsonBody)
    }
}

impl<T> From<JsonBody<T>> for Option<T> {
    fn from(body: JsonBody<T>) -> Self {
        body.0
    }
}

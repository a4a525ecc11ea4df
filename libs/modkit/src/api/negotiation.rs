//! Response content negotiation between JSON and XML.
//!
//! The `Accept` header is ranked by `q` value (ties keep header order). Both
//! formats encode the same field set; XML needs an explicit root element name
//! because the payload types carry no document root of their own.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::problem::{internal_error, not_acceptable, ProblemResponse};

pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";
pub const APPLICATION_XML: &str = "application/xml; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Json => APPLICATION_JSON,
            ResponseFormat::Xml => APPLICATION_XML,
        }
    }

    /// Pick the preferred format for an `Accept` header value.
    ///
    /// A missing or blank header means JSON. `None` means the client listed
    /// only media types we cannot produce.
    pub fn negotiate(accept: Option<&str>) -> Option<Self> {
        let accept = match accept.map(str::trim) {
            None | Some("") => return Some(ResponseFormat::Json),
            Some(a) => a,
        };

        let mut best: Option<(f32, ResponseFormat)> = None;
        for range in accept.split(',') {
            let mut parts = range.split(';');
            let media = parts.next().unwrap_or("").trim().to_ascii_lowercase();
            let q = parts
                .filter_map(|p| p.split_once('='))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("q"))
                .map(|(_, v)| v.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            if q <= 0.0 {
                continue;
            }
            let Some(format) = Self::from_media_range(&media) else {
                continue;
            };
            // strict `>` keeps the earliest entry on equal weight
            if best.map_or(true, |(best_q, _)| q > best_q) {
                best = Some((q, format));
            }
        }
        best.map(|(_, f)| f)
    }

    fn from_media_range(media: &str) -> Option<Self> {
        match media {
            "application/json" | "text/json" | "*/*" | "application/*" | "text/*" => {
                Some(ResponseFormat::Json)
            }
            "application/xml" | "text/xml" => Some(ResponseFormat::Xml),
            m if m.starts_with("application/") && m.ends_with("+json") => Some(ResponseFormat::Json),
            m if m.starts_with("application/") && m.ends_with("+xml") => Some(ResponseFormat::Xml),
            _ => None,
        }
    }

    /// Serialize `value` in this format.
    pub fn encode<T: Serialize + ?Sized>(
        self,
        value: &T,
        xml_root: &str,
    ) -> Result<String, ProblemResponse> {
        match self {
            ResponseFormat::Json => serde_json::to_string(value).map_err(|e| {
                tracing::error!(error = %e, "JSON serialization failed");
                internal_error("Failed to serialize response")
            }),
            ResponseFormat::Xml => quick_xml::se::to_string_with_root(xml_root, value).map_err(|e| {
                tracing::error!(error = %e, root = xml_root, "XML serialization failed");
                internal_error("Failed to serialize response")
            }),
        }
    }
}

/// The client's negotiated response format, taken from the `Accept` header.
///
/// Extraction never fails; an unsatisfiable header only turns into
/// `406 Not Acceptable` once a handler actually tries to write a body.
#[derive(Debug, Clone, Copy)]
pub struct Accept(pub Option<ResponseFormat>);

impl Accept {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<&str> = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            return Accept(ResponseFormat::negotiate(None));
        }
        Accept(ResponseFormat::negotiate(Some(&values.join(","))))
    }

    pub fn format(&self) -> Result<ResponseFormat, ProblemResponse> {
        self.0.ok_or_else(|| {
            not_acceptable("Supported response media types are application/json and application/xml")
        })
    }

    /// Render one value with the same shape in both formats.
    pub fn respond<T: Serialize + ?Sized>(
        &self,
        status: StatusCode,
        value: &T,
        xml_root: &str,
    ) -> Result<Response, ProblemResponse> {
        let format = self.format()?;
        let body = format.encode(value, xml_root)?;
        Ok(with_content_type(status, format, body))
    }

    /// Render a value whose XML form needs a different wrapper (e.g. sequences).
    pub fn respond_split<J, X>(
        &self,
        status: StatusCode,
        json: &J,
        xml: &X,
        xml_root: &str,
    ) -> Result<Response, ProblemResponse>
    where
        J: Serialize + ?Sized,
        X: Serialize + ?Sized,
    {
        let format = self.format()?;
        let body = match format {
            ResponseFormat::Json => format.encode(json, xml_root)?,
            ResponseFormat::Xml => format.encode(xml, xml_root)?,
        };
        Ok(with_content_type(status, format, body))
    }
}

fn with_content_type(status: StatusCode, format: ResponseFormat, body: String) -> Response {
    let mut resp = (status, body).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    resp
}

impl<S> FromRequestParts<S> for Accept
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Accept::from_headers(&parts.headers))
    }
}

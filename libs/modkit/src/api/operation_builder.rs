//! Type-safe route builder with compile-time guarantees
//!
//! `register()` is only available once a handler is set; naming methods stay
//! available at any stage.
//!
//! Registered operations are recorded in a [`RouteRegistry`] so that other
//! parts of the service (link generation, `Allow` headers) can look routes up
//! by operation id or path instead of hard-coding URLs.

use axum::{handler::Handler, routing::MethodRouter, Router};
use http::Method;
use std::marker::PhantomData;

/// Type-state markers for compile-time enforcement
pub mod state {
    /// Marker for missing required components
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    /// Marker for present required components
    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

/// Internal trait mapping handler state to the concrete router slot type.
/// For `Missing` there is no router slot; for `Present` it is `MethodRouter<S>`.
mod sealed {
    pub trait Sealed {}
}

pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}
impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

pub use state::{Missing, Present};

/// Descriptor of one (method, path) route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
}

/// Sink for registered operations.
pub trait RouteRegistry: Send + Sync {
    fn register_operation(&self, spec: &OperationSpec);
}

/// Type-safe operation builder.
///
/// Generic parameters:
/// - `H`: Handler state (Missing | Present)
/// - `S`: Router state type (what you put into `Router::with_state(S)`).
pub struct OperationBuilder<H, S>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _has_handler: PhantomData<H>,
    #[allow(clippy::type_complexity)]
    _state: PhantomData<fn() -> S>,
}

// -------------------------------------------------------------------------------------------------
// Constructors: start without a handler
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Missing, S> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path: path.into(),
                operation_id: None,
                summary: None,
            },
            method_router: (),
            _has_handler: PhantomData,
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn options(path: impl Into<String>) -> Self {
        Self::new(Method::OPTIONS, path)
    }
}

// -------------------------------------------------------------------------------------------------
// Naming: available at any stage
// -------------------------------------------------------------------------------------------------
impl<H, S> OperationBuilder<H, S>
where
    H: HandlerSlot<S>,
{
    /// Inspect the spec (primarily for tests)
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    /// Operation ids are the names used by link generation.
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    /// One-line description shown in the route listing.
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }
}

// -------------------------------------------------------------------------------------------------
// Handler setting: transitions Missing -> Present
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Missing, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Set the handler for this operation (function handlers are recommended).
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::GET => axum::routing::get(h),
            Method::HEAD => axum::routing::head(h),
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::DELETE => axum::routing::delete(h),
            Method::PATCH => axum::routing::patch(h),
            Method::OPTIONS => axum::routing::options(h),
            _ => axum::routing::any(|| async { axum::http::StatusCode::METHOD_NOT_ALLOWED }),
        };

        OperationBuilder {
            spec: self.spec,
            method_router,
            _has_handler: PhantomData::<Present>,
            _state: self._state,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Registration: only available once a handler is present
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Record the operation in `registry` and mount its handler on `router`.
    ///
    /// Registering several methods on the same path merges them into one
    /// `MethodRouter`.
    pub fn register(self, router: Router<S>, registry: &dyn RouteRegistry) -> Router<S> {
        registry.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}

//! Version resolution and dispatch.
//!
//! # Responsibilities
//! - Store versioned routes in registration order
//! - Resolve a request's version token to exactly one route, or fail
//! - Delegate to the selected route's chain, or to the unresolved handler
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - First match in registration order wins; no specificity ranking
//! - The first default route catches both unversioned and unmatched requests
//! - Duplicate defaults are tolerated unless the set is validated eagerly

use std::{
    convert::Infallible,
    future::Future,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower::Service;

use crate::http::request::RequestVersion;
use crate::observability::metrics;
use crate::routing::chain::{BoxResponseFuture, Continuation, Tail};
use crate::routing::error::{RouteError, RouteSetError};
use crate::routing::matcher::{SemverMatcher, VersionMatcher};
use crate::routing::route::VersionedRoute;

/// Called when no route qualifies for a request.
///
/// `next` leads past the router: into the inner service when mounted as
/// middleware, or to a bare `404` when mounted as a service.
pub trait UnresolvedHandler: Send + Sync + 'static {
    fn handle(&self, req: Request<Body>, error: RouteError, next: Continuation) -> BoxResponseFuture;
}

impl<F, Fut> UnresolvedHandler for F
where
    F: Fn(Request<Body>, RouteError, Continuation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request<Body>, error: RouteError, next: Continuation) -> BoxResponseFuture {
        Box::pin((self)(req, error, next))
    }
}

/// Default unresolved handler: `404` carrying the error message.
pub async fn not_found_for_version(
    req: Request<Body>,
    error: RouteError,
    _next: Continuation,
) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        version = error.version().unwrap_or("undefined"),
        "No versioned route matched"
    );
    error.into_response()
}

/// Construction-time options for a [`VersionRouter`].
#[derive(Clone)]
pub struct VersionRouterOptions {
    matcher: Arc<dyn VersionMatcher>,
    on_unresolved: Arc<dyn UnresolvedHandler>,
}

impl VersionRouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the constraint predicate (default: [`SemverMatcher`]).
    pub fn matcher<M: VersionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Replace the unresolved handler (default: [`not_found_for_version`]).
    pub fn on_unresolved<H: UnresolvedHandler>(mut self, handler: H) -> Self {
        self.on_unresolved = Arc::new(handler);
        self
    }
}

impl Default for VersionRouterOptions {
    fn default() -> Self {
        Self {
            matcher: Arc::new(SemverMatcher),
            on_unresolved: Arc::new(not_found_for_version),
        }
    }
}

impl std::fmt::Debug for VersionRouterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionRouterOptions")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// How a route was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Its constraint was satisfied by the token.
    Constraint,
    /// Fallback to the first default route.
    Default,
}

impl Selection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Selection::Constraint => "constraint",
            Selection::Default => "default",
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Position of the route in registration order.
    pub index: usize,
    pub route: &'a VersionedRoute,
    pub selection: Selection,
}

struct Inner {
    routes: Vec<VersionedRoute>,
    matcher: Arc<dyn VersionMatcher>,
    on_unresolved: Arc<dyn UnresolvedHandler>,
}

/// Dispatches requests to one of several versioned handler chains.
///
/// Mount it as a service (`Router::route_service`, `nest_service`), where a
/// chain that falls through ends in `404`, or as middleware through
/// [`route_request_by_version`], where it falls through to the inner service.
/// Either way the version token must already be attached by
/// [`ExtractVersionLayer`](crate::http::ExtractVersionLayer).
#[derive(Clone)]
pub struct VersionRouter {
    inner: Arc<Inner>,
}

impl VersionRouter {
    /// Create a router with default options.
    pub fn new(routes: Vec<VersionedRoute>) -> Self {
        Self::with_options(routes, VersionRouterOptions::default())
    }

    pub fn with_options(routes: Vec<VersionedRoute>, options: VersionRouterOptions) -> Self {
        tracing::debug!(
            routes = routes.len(),
            defaults = routes.iter().filter(|r| r.is_default()).count(),
            "Version router built"
        );
        Self {
            inner: Arc::new(Inner {
                routes,
                matcher: options.matcher,
                on_unresolved: options.on_unresolved,
            }),
        }
    }

    /// Like [`with_options`](Self::with_options), but rejects route sets with
    /// more than one default or with constraints the matcher cannot parse.
    pub fn validated(
        routes: Vec<VersionedRoute>,
        options: VersionRouterOptions,
    ) -> Result<Self, Vec<RouteSetError>> {
        validate_route_set(
            routes.iter().map(|r| (r.version(), r.is_default())),
            options.matcher.as_ref(),
        )?;
        Ok(Self::with_options(routes, options))
    }

    pub fn routes(&self) -> &[VersionedRoute] {
        &self.inner.routes
    }

    /// Pick the route for a version token.
    ///
    /// A present token selects the first route whose constraint it satisfies.
    /// An absent or empty token, or one that matches nothing, selects the
    /// first default route.
    pub fn resolve(&self, version: Option<&str>) -> Result<Resolved<'_>, RouteError> {
        let version = version.filter(|v| !v.is_empty());
        let routes = &self.inner.routes;

        if let Some(token) = version {
            let matched = routes
                .iter()
                .enumerate()
                .find(|(_, route)| self.inner.matcher.satisfies(token, route.version()));
            if let Some((index, route)) = matched {
                return Ok(Resolved {
                    index,
                    route,
                    selection: Selection::Constraint,
                });
            }
        }

        match routes.iter().enumerate().find(|(_, route)| route.is_default()) {
            Some((index, route)) => Ok(Resolved {
                index,
                route,
                selection: Selection::Default,
            }),
            None => Err(match version {
                Some(token) => RouteError::NoConstraintMatch {
                    version: token.to_string(),
                },
                None => RouteError::NoVersionSupplied,
            }),
        }
    }

    pub(crate) async fn dispatch(&self, req: Request<Body>, tail: Tail) -> Response {
        let version = req
            .extensions()
            .get::<RequestVersion>()
            .and_then(|v| v.as_deref().map(str::to_owned));

        let chain = match self.resolve(version.as_deref()) {
            Ok(resolved) => {
                tracing::debug!(
                    version = version.as_deref().unwrap_or("undefined"),
                    route = resolved.route.label(),
                    index = resolved.index,
                    selection = resolved.selection.as_str(),
                    "Resolved versioned route"
                );
                metrics::record_resolution(resolved.selection.as_str());
                Ok(resolved.route.chain())
            }
            Err(error) => {
                tracing::debug!(error = %error, "Version resolution failed");
                metrics::record_resolution("unresolved");
                Err(error)
            }
        };

        match chain {
            Ok(chain) => Continuation::new(chain, tail).run(req).await,
            Err(error) => {
                self.inner
                    .on_unresolved
                    .handle(req, error, Continuation::tail_only(tail))
                    .await
            }
        }
    }
}

impl std::fmt::Debug for VersionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionRouter")
            .field("routes", &self.inner.routes)
            .field("matcher", &self.inner.matcher)
            .finish_non_exhaustive()
    }
}

impl Service<Request<Body>> for VersionRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.dispatch(req, Tail::NotFound).await) })
    }
}

/// Middleware entry point for `axum::middleware::from_fn_with_state`.
///
/// ```ignore
/// Router::new()
///     .route("/users", get(fallback))
///     .layer(middleware::from_fn_with_state(users, route_request_by_version))
/// ```
pub async fn route_request_by_version(
    State(router): State<VersionRouter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    router.dispatch(req, Tail::Next(next)).await
}

/// Check a route set given as `(constraint, default)` pairs.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_route_set<'a>(
    entries: impl IntoIterator<Item = (&'a str, bool)>,
    matcher: &dyn VersionMatcher,
) -> Result<(), Vec<RouteSetError>> {
    let mut errors = Vec::new();
    let mut first_default: Option<usize> = None;

    for (index, (constraint, default)) in entries.into_iter().enumerate() {
        if let Err(reason) = matcher.check_constraint(constraint) {
            errors.push(RouteSetError::InvalidConstraint {
                index,
                constraint: constraint.to_string(),
                reason,
            });
        }
        if default {
            match first_default {
                Some(first) => errors.push(RouteSetError::DuplicateDefault {
                    first,
                    second: index,
                }),
                None => first_default = Some(index),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

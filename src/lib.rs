//! Version-based request routing for axum.
//!
//! A [`VersionRouter`] holds several handler chains, each tagged with a
//! version constraint, and dispatches every request to the first chain whose
//! constraint the request's version token satisfies. The token is attached
//! upstream by [`ExtractVersionLayer`].
//!
//! ```ignore
//! let users = VersionRouter::new(vec![
//!     VersionedRoute::new("1.0.0", HandlerChain::new().handler(users_v1)),
//!     VersionedRoute::new(">=1.2.0 <2.0.0", HandlerChain::new().handler(users_v2)),
//!     VersionedRoute::new("2.0.0", HandlerChain::new().handler(users_v3)).default_route(),
//! ]);
//!
//! let app = Router::new()
//!     .route_service("/users", users)
//!     .layer(ExtractVersionLayer::try_from_header("Accept-Version")?);
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use http::{AppServer, ExtractVersionLayer, RequestVersion};
pub use routing::{
    route_request_by_version, Continuation, HandlerChain, RouteError, VersionRouter,
    VersionRouterOptions, VersionedRoute,
};

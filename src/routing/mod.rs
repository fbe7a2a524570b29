//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (RequestVersion extension)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (evaluate version constraints)
//!     → Selected route → chain.rs (run handler chain)
//!     → No route → unresolved handler (default: 404 RouteError)
//!
//! Route Registration (at startup):
//!     VersionedRoute[]
//!     → Freeze as immutable VersionRouter
//! ```
//!
//! # Design Decisions
//! - Routes fixed at construction, immutable at runtime
//! - Deterministic: same token always selects the same route
//! - First match wins (ordered by registration)
//! - The first default route is the shared fallback

pub mod chain;
pub mod error;
pub mod matcher;
pub mod route;
pub mod router;

pub use chain::{BoxResponseFuture, Continuation, HandlerChain, Step};
pub use error::{RouteError, RouteSetError};
pub use matcher::{ExactMatcher, SemverMatcher, VersionMatcher};
pub use route::VersionedRoute;
pub use router::{
    not_found_for_version, route_request_by_version, validate_route_set, Resolved, Selection,
    UnresolvedHandler, VersionRouter, VersionRouterOptions,
};

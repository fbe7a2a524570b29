//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (attach RequestVersion from header)
//!     → routing::VersionRouter (one per path)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{
    extract_version_from_header, ExtractVersion, ExtractVersionLayer, RequestVersion,
    ACCEPT_VERSION,
};
pub use server::AppServer;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → http::server builds one VersionRouter per path
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routers are never rebuilt at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, RouteConfig, RouterConfig, TimeoutConfig, VersionConfig};
pub use validation::{validate_config, ValidationError};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Extractor and router produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (resolution counters)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

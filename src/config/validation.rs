//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (addresses, status codes, header names)
//! - In strict mode, check each path's route set eagerly
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::{HeaderName, StatusCode};
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::{validate_route_set, RouteSetError, SemverMatcher};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid version header name `{0}`")]
    InvalidHeader(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("route {index}: empty version constraint")]
    EmptyVersion { index: usize },

    #[error("route {index}: invalid path `{path}`")]
    InvalidPath { index: usize, path: String },

    #[error("route {index}: invalid status code {status}")]
    InvalidStatus { index: usize, status: u16 },

    #[error("path `{path}`: {source}")]
    RouteSet {
        path: String,
        #[source]
        source: RouteSetError,
    },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if HeaderName::from_bytes(config.version.header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(config.version.header.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.version.trim().is_empty() {
            errors.push(ValidationError::EmptyVersion { index });
        }
        if !valid_path(&route.path) {
            errors.push(ValidationError::InvalidPath {
                index,
                path: route.path.clone(),
            });
        }
        if StatusCode::from_u16(route.status).is_err() {
            errors.push(ValidationError::InvalidStatus {
                index,
                status: route.status,
            });
        }
    }

    if config.version.strict {
        for (path, indices) in group_by_path(config) {
            let entries = indices
                .iter()
                .map(|&i| (config.routes[i].version.as_str(), config.routes[i].default));
            if let Err(set_errors) = validate_route_set(entries, &SemverMatcher) {
                errors.extend(set_errors.into_iter().map(|source| ValidationError::RouteSet {
                    path: path.to_string(),
                    source,
                }));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Absolute, and captures (if any) in `{name}` form.
fn valid_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

/// Route indices grouped by path, paths in order of first appearance.
pub(crate) fn group_by_path(config: &RouterConfig) -> Vec<(&str, Vec<usize>)> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, route) in config.routes.iter().enumerate() {
        match groups.iter().position(|(path, _)| *path == route.path) {
            Some(at) => groups[at].1.push(index),
            None => groups.push((route.path.as_str(), vec![index])),
        }
    }
    groups
}

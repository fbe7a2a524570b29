//! Resolution failures and route-set validation errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Why a request could not be resolved to a versioned route.
///
/// Both variants surface through the router's unresolved handler. The
/// rendered message echoes the attempted token, or `undefined` when the
/// request carried none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No version token and no default route.
    #[error("Route not found for version undefined")]
    NoVersionSupplied,

    /// The token matched no constraint and there is no default route.
    #[error("Route not found for version {version}")]
    NoConstraintMatch { version: String },
}

impl RouteError {
    /// The token that failed to resolve, if one was supplied.
    pub fn version(&self) -> Option<&str> {
        match self {
            RouteError::NoVersionSupplied => None,
            RouteError::NoConstraintMatch { version } => Some(version),
        }
    }
}

impl IntoResponse for RouteError {
    /// `404` with `{"errorMessage": ...}`. The error itself rides along in the
    /// response extensions so an outer layer can remap it.
    fn into_response(self) -> Response {
        let body = Json(json!({ "errorMessage": self.to_string() }));
        let mut response = (StatusCode::NOT_FOUND, body).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// A problem found when a route set is validated eagerly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteSetError {
    #[error("routes {first} and {second} are both marked default")]
    DuplicateDefault { first: usize, second: usize },

    #[error("route {index} has an invalid version constraint `{constraint}`: {reason}")]
    InvalidConstraint {
        index: usize,
        constraint: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_echo_token() {
        let err = RouteError::NoConstraintMatch {
            version: "1.1.0".into(),
        };
        assert_eq!(err.to_string(), "Route not found for version 1.1.0");
        assert_eq!(err.version(), Some("1.1.0"));

        let err = RouteError::NoVersionSupplied;
        assert_eq!(err.to_string(), "Route not found for version undefined");
        assert_eq!(err.version(), None);
    }

    #[tokio::test]
    async fn test_into_response_is_404_json() {
        let response = RouteError::NoConstraintMatch {
            version: "3.0.0".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.extensions().get::<RouteError>().and_then(|e| e.version()),
            Some("3.0.0")
        );

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorMessage"], "Route not found for version 3.0.0");
    }
}

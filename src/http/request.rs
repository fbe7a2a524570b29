//! Request preprocessing: version extraction.
//!
//! # Responsibilities
//! - Read the version token from a configurable request header
//! - Attach it to the request as a [`RequestVersion`] extension
//! - Always pass the request on; a missing header is not an error
//!
//! # Design Decisions
//! - Header lookup is case-insensitive because `HeaderMap` is
//! - Values that are not visible ASCII are treated as absent
//! - Mount once, before every versioned router

use std::{
    convert::Infallible,
    task::{Context, Poll},
};

use axum::{
    extract::FromRequestParts,
    http::{header::InvalidHeaderName, request::Parts, HeaderName, Request},
};
use tower::{Layer, Service};

/// Default header carrying the requested API version.
pub const ACCEPT_VERSION: &str = "accept-version";

/// The version token attached to a request, if the client sent one.
///
/// Also usable as an axum extractor; a request that never passed through
/// [`ExtractVersionLayer`] yields `RequestVersion(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestVersion(Option<String>);

impl RequestVersion {
    pub fn new(version: Option<String>) -> Self {
        Self(version)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl<S> FromRequestParts<S> for RequestVersion
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestVersion>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Layer that attaches [`RequestVersion`] from a request header.
#[derive(Debug, Clone)]
pub struct ExtractVersionLayer {
    header: HeaderName,
}

impl ExtractVersionLayer {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Build from a header name in any case, e.g. `"Accept-Version"`.
    pub fn try_from_header(header: &str) -> Result<Self, InvalidHeaderName> {
        HeaderName::from_bytes(header.as_bytes()).map(Self::new)
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for ExtractVersionLayer {
    fn default() -> Self {
        Self::new(HeaderName::from_static(ACCEPT_VERSION))
    }
}

impl<S> Layer<S> for ExtractVersionLayer {
    type Service = ExtractVersion<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExtractVersion {
            inner,
            header: self.header.clone(),
        }
    }
}

/// Shorthand for [`ExtractVersionLayer::new`].
pub fn extract_version_from_header(header: HeaderName) -> ExtractVersionLayer {
    ExtractVersionLayer::new(header)
}

/// Service produced by [`ExtractVersionLayer`].
#[derive(Debug, Clone)]
pub struct ExtractVersion<S> {
    inner: S,
    header: HeaderName,
}

impl<S, B> Service<Request<B>> for ExtractVersion<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let version = req
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        tracing::trace!(header = %self.header, version = ?version, "Extracted request version");

        req.extensions_mut().insert(RequestVersion(version));
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::HeaderValue, routing::get, Router};
    use tower::ServiceExt;

    async fn echo(version: RequestVersion) -> String {
        version.into_inner().unwrap_or_else(|| "none".to_string())
    }

    async fn call(app: Router, req: Request<Body>) -> String {
        let response = app.oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn app(layer: ExtractVersionLayer) -> Router {
        Router::new().route("/", get(echo)).layer(layer)
    }

    #[tokio::test]
    async fn test_extracts_header_case_insensitively() {
        let layer = ExtractVersionLayer::try_from_header("Accept-version").unwrap();
        assert_eq!(layer.header().as_str(), "accept-version");

        let req = Request::builder()
            .uri("/")
            .header("ACCEPT-VERSION", "1.2.0")
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(app(layer), req).await, "1.2.0");
    }

    #[tokio::test]
    async fn test_missing_header_is_none() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(call(app(ExtractVersionLayer::default()), req).await, "none");
    }

    #[tokio::test]
    async fn test_custom_header() {
        let layer = extract_version_from_header(HeaderName::from_static("x-api-version"));
        let req = Request::builder()
            .uri("/")
            .header("x-api-version", "2.0.0")
            .header("accept-version", "1.0.0")
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(app(layer), req).await, "2.0.0");
    }

    #[tokio::test]
    async fn test_opaque_value_is_none() {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        req.headers_mut().insert(
            "accept-version",
            HeaderValue::from_bytes(b"1.0\xff").unwrap(),
        );
        assert_eq!(call(app(ExtractVersionLayer::default()), req).await, "none");
    }

    #[tokio::test]
    async fn test_extractor_without_layer() {
        let app = Router::new().route("/", get(echo));
        let req = Request::builder()
            .uri("/")
            .header("accept-version", "1.0.0")
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(app, req).await, "none");
    }

    #[test]
    fn test_rejects_invalid_header_name() {
        assert!(ExtractVersionLayer::try_from_header("bad header").is_err());
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build one version router per configured path
//! - Wire up middleware (tracing, timeout, version extraction)
//! - Bind server to listener and shut down gracefully

use std::future::Future;
use std::time::Duration;

use axum::{http::StatusCode, Json, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::validation::{group_by_path, validate_config, ValidationError};
use crate::config::{ConfigError, RouteConfig, RouterConfig};
use crate::http::request::ExtractVersionLayer;
use crate::routing::{HandlerChain, VersionRouter, VersionedRoute};

/// HTTP server serving the configured versioned routes.
pub struct AppServer {
    router: Router,
    config: RouterConfig,
}

impl AppServer {
    /// Validate the configuration and build the application router.
    pub fn new(config: RouterConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let router = Self::build_router(&config)?;
        Ok(Self { router, config })
    }

    #[allow(deprecated)]
    fn build_router(config: &RouterConfig) -> Result<Router, ConfigError> {
        let extract = ExtractVersionLayer::try_from_header(&config.version.header).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidHeader(
                config.version.header.clone(),
            )])
        })?;

        let mut app = Router::new();
        for (path, indices) in group_by_path(config) {
            let routes: Vec<VersionedRoute> = indices
                .iter()
                .map(|&i| static_route(&config.routes[i]))
                .collect();
            tracing::info!(path = %path, routes = routes.len(), "Mounting version router");
            app = app.route_service(path, VersionRouter::new(routes));
        }

        Ok(app
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(extract)
            .layer(TraceLayer::new_for_http()))
    }

    /// The application router, for driving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `signal` completes.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A route whose chain answers with the configured status and body.
fn static_route(route: &RouteConfig) -> VersionedRoute {
    let status = StatusCode::from_u16(route.status).unwrap_or(StatusCode::OK);
    let body = route.body.clone();
    let chain = HandlerChain::new().handler(move || async move { (status, Json(body)) });

    let versioned = VersionedRoute::new(route.version.clone(), chain).with_default(route.default);
    match &route.name {
        Some(name) => versioned.named(name.clone()),
        None => versioned,
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn config() -> RouterConfig {
        let mut config = RouterConfig::default();
        let route = |path: &str, version: &str, default: bool, tag: &str| RouteConfig {
            name: None,
            path: path.into(),
            version: version.into(),
            default,
            status: 200,
            body: serde_json::json!({ "route": tag }),
        };
        config.routes = vec![
            route("/users", "1.0.0", false, "users-1"),
            route("/orders", "1.0.0", true, "orders-1"),
            route("/users", "2.0.0", true, "users-2"),
        ];
        config
    }

    async fn get(app: Router, path: &str, version: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(path);
        if let Some(v) = version {
            builder = builder.header("accept-version", v);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_each_path_has_its_own_router() {
        let server = AppServer::new(config()).unwrap();
        assert_eq!(server.config().routes.len(), 3);

        let (status, body) = get(server.router(), "/users", Some("1.0.0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], "users-1");

        let (_, body) = get(server.router(), "/users", None).await;
        assert_eq!(body["route"], "users-2");

        let (_, body) = get(server.router(), "/orders", Some("9.0.0")).await;
        assert_eq!(body["route"], "orders-1");
    }

    #[tokio::test]
    async fn test_configured_status() {
        let mut config = config();
        config.routes[0].status = 202;
        let server = AppServer::new(config).unwrap();

        let (status, _) = get(server.router(), "/users", Some("1.0.0")).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let server = AppServer::new(config()).unwrap();
        let (status, _) = get(server.router(), "/nothing", Some("1.0.0")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = config();
        config.version.header = "bad header".into();
        assert!(matches!(AppServer::new(config), Err(ConfigError::Validation(_))));
    }
}

//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use version_router::AppServer;

/// Serve `app` on an ephemeral port and return its address.
#[allow(dead_code)]
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Run a configured server on an ephemeral port.
///
/// Dropping the returned sender shuts the server down; the handle resolves
/// once it has stopped.
#[allow(dead_code)]
pub async fn spawn_server(
    server: AppServer,
) -> (
    SocketAddr,
    tokio::sync::oneshot::Sender<()>,
    JoinHandle<Result<(), std::io::Error>>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .run_until(listener, async move {
                let _ = rx.await;
            })
            .await
    });
    (addr, tx, handle)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

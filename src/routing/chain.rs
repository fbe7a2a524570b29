//! Handler chains.
//!
//! A chain is an ordered list of steps. Each step receives the request and a
//! [`Continuation`]; it either produces the response itself or calls
//! `next.run(req)` to hand the request to the following step. When the last
//! step continues, control leaves the chain through its tail.

use std::{future::Future, sync::Arc};

use axum::{
    body::Body,
    handler::Handler,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use futures_util::future::BoxFuture;
use tower::ServiceExt;

/// Boxed response future returned by steps and unresolved handlers.
pub type BoxResponseFuture = BoxFuture<'static, Response>;

/// One request-processing step of a [`HandlerChain`].
pub trait Step: Send + Sync + 'static {
    fn call(&self, req: Request<Body>, next: Continuation) -> BoxResponseFuture;
}

impl<F, Fut> Step for F
where
    F: Fn(Request<Body>, Continuation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request<Body>, next: Continuation) -> BoxResponseFuture {
        Box::pin((self)(req, next))
    }
}

/// Ordered sequence of steps run for a selected route.
#[derive(Clone, Default)]
pub struct HandlerChain {
    steps: Vec<Arc<dyn Step>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn step<S: Step>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append a terminal step backed by an axum handler.
    pub fn handler<H, T>(self, handler: H) -> Self
    where
        H: Handler<T, ()> + Sync,
        T: 'static,
    {
        self.step(move |req: Request<Body>, _next: Continuation| {
            <H as Handler<T, ()>>::call(handler.clone(), req, ())
        })
    }

    /// Append a terminal step that hands the request to a nested router.
    pub fn router(self, router: Router) -> Self {
        self.step(move |req: Request<Body>, _next: Continuation| {
            let router = router.clone();
            async move {
                match router.oneshot(req).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Where a request goes once a chain runs out of steps.
pub(crate) enum Tail {
    /// The next stage of the host middleware stack.
    Next(Next),
    /// Nothing downstream: answer `404 Not Found`.
    NotFound,
}

impl Tail {
    async fn run(self, req: Request<Body>) -> Response {
        match self {
            Tail::Next(next) => next.run(req).await,
            Tail::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

/// The "next" handed to a step.
pub struct Continuation {
    chain: Option<Arc<HandlerChain>>,
    index: usize,
    tail: Tail,
}

impl Continuation {
    pub(crate) fn new(chain: Arc<HandlerChain>, tail: Tail) -> Self {
        Self {
            chain: Some(chain),
            index: 0,
            tail,
        }
    }

    /// A continuation that goes straight to the tail.
    pub(crate) fn tail_only(tail: Tail) -> Self {
        Self {
            chain: None,
            index: 0,
            tail,
        }
    }

    /// A continuation with nothing downstream; running it yields `404`.
    pub fn not_found() -> Self {
        Self::tail_only(Tail::NotFound)
    }

    /// Run the remaining steps, then the tail.
    pub async fn run(self, req: Request<Body>) -> Response {
        let step = self
            .chain
            .as_ref()
            .and_then(|chain| chain.steps.get(self.index).cloned());

        match step {
            Some(step) => {
                let next = Continuation {
                    chain: self.chain,
                    index: self.index + 1,
                    tail: self.tail,
                };
                step.call(req, next).await
            }
            None => self.tail.run(req).await,
        }
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuation")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counting_step(counter: Arc<AtomicUsize>) -> impl Step {
        move |req: Request<Body>, next: Continuation| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(req)
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_builder_counts_steps() {
        let chain = HandlerChain::new()
            .step(|req: Request<Body>, next: Continuation| next.run(req))
            .step(|req: Request<Body>, next: Continuation| next.run(req))
            .handler(|| async { "done" });
        assert_eq!(chain.len(), 3);
        assert!(!chain.is_empty());
        assert!(HandlerChain::new().is_empty());
    }

    #[tokio::test]
    async fn test_steps_run_in_order_until_terminal() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = HandlerChain::new()
            .step(counting_step(counter.clone()))
            .step(counting_step(counter.clone()))
            .handler(|| async { "route 1" });

        let response = Continuation::new(Arc::new(chain), Tail::NotFound)
            .run(Request::new(Body::empty()))
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "route 1");
    }

    #[tokio::test]
    async fn test_step_can_short_circuit() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = HandlerChain::new()
            .step(|_req: Request<Body>, _next: Continuation| async {
                (StatusCode::FORBIDDEN, "stop").into_response()
            })
            .step(counting_step(counter.clone()));

        let response = Continuation::new(Arc::new(chain), Tail::NotFound)
            .run(Request::new(Body::empty()))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fall_through_hits_tail() {
        let chain = HandlerChain::new().step(|req: Request<Body>, next: Continuation| next.run(req));

        let response = Continuation::new(Arc::new(chain), Tail::NotFound)
            .run(Request::new(Body::empty()))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Continuation::not_found().run(Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nested_router_step() {
        let nested = Router::new().route("/users", axum::routing::get(|| async { "users v2" }));
        let chain = HandlerChain::new().router(nested);

        let req = Request::builder().uri("/users").body(Body::empty()).unwrap();
        let response = Continuation::new(Arc::new(chain), Tail::NotFound).run(req).await;
        assert_eq!(body_string(response).await, "users v2");
    }
}

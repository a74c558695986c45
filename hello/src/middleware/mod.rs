//! Middleware wrapping the router.
//!
//! Middlewares run in the order they were added. Each one receives a
//! [`Next`] that runs the remainder of the chain and finally the router.

mod request_log;
mod timeout;
mod trace_id;

pub use request_log::RequestLogMiddleware;
pub use timeout::TimeoutMiddleware;
pub use trace_id::{TRACE_ID_HEADER, TraceIdMiddleware};
pub(crate) use trace_id::incoming_trace_id;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::Response;

use crate::context::RequestContext;
use crate::response::BoxBody;
use crate::router::{Request, Router};
use crate::state::AppState;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        req: Request,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>>;
}

pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    router: &'a Router,
    state: &'a Arc<AppState>,
    ctx: &'a RequestContext,
}

impl<'a> Next<'a> {
    pub async fn run(self, req: Request) -> Response<BoxBody> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    middlewares: rest,
                    ..self
                };
                current.handle(req, self.ctx, next).await
            }
            None => self.router.handle(req, self.state).await,
        }
    }
}

#[derive(Default)]
pub struct MiddlewareStack {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub async fn execute(
        &self,
        req: Request,
        router: &Router,
        state: &Arc<AppState>,
        ctx: &RequestContext,
    ) -> Response<BoxBody> {
        let next = Next {
            middlewares: &self.middlewares,
            router,
            state,
            ctx,
        };
        next.run(req).await
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};

    struct Tag {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Tag {
        fn handle<'a>(
            &'a self,
            req: Request,
            _ctx: &'a RequestContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response<BoxBody>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(self.name);
                let mut response = next.run(req).await;
                response
                    .headers_mut()
                    .append("x-tag", HeaderValue::from_static(self.name));
                response
            })
        }
    }

    #[tokio::test]
    async fn test_middlewares_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut stack = MiddlewareStack::new();
        stack.add(Tag {
            name: "outer",
            seen: seen.clone(),
        });
        stack.add(Tag {
            name: "inner",
            seen: seen.clone(),
        });
        assert_eq!(stack.len(), 2);

        let router = Router::new().get("/", |_, _, _| async { "Hello" });
        let state = Arc::new(AppState::new());
        let req = http::Request::get("/").body(Bytes::new()).unwrap();

        let response = stack
            .execute(req, &router, &state, &RequestContext::new())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);

        // responses unwind inner-first
        let tags: Vec<_> = response.headers().get_all("x-tag").iter().collect();
        assert_eq!(tags, vec!["inner", "outer"]);
    }

    #[tokio::test]
    async fn test_empty_stack_reaches_router() {
        let stack = MiddlewareStack::new();
        assert!(stack.is_empty());

        let router = Router::new();
        let state = Arc::new(AppState::new());
        let req = http::Request::get("/missing").body(Bytes::new()).unwrap();

        let response = stack
            .execute(req, &router, &state, &RequestContext::new())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

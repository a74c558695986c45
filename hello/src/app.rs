use std::any::Any;
use std::io;
use std::sync::Arc;

use http::Response;
use http::header::HeaderValue;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{
    Middleware, MiddlewareStack, RequestLogMiddleware, TRACE_ID_HEADER, TimeoutMiddleware,
    TraceIdMiddleware, incoming_trace_id,
};
use crate::response::{BoxBody, IntoResponse};
use crate::router::{Request, Router};
use crate::routes::{self, Greeting};
use crate::server;
use crate::state::AppState;

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the greeting application described by `config`.
pub fn app(config: &Config) -> App {
    App::new()
        .router(routes::router())
        .state(Greeting::new(config.name.clone()))
        .middleware(TraceIdMiddleware::new())
        .middleware(RequestLogMiddleware::new())
        .middleware(TimeoutMiddleware::new(config.request_timeout))
        .max_body_bytes(config.max_body_bytes)
        .testing(config.testing)
}

/// An HTTP application: routes, shared state, middleware and an error mode.
///
/// In production mode a panicking handler becomes a generic
/// `500 INTERNAL_ERROR` response. In testing mode the panic is resumed in
/// the [`TestClient`](crate::testing::TestClient) caller, so a test sees the
/// original failure. Served over TCP, a testing-mode app still answers `500`
/// but puts the panic text in the error details.
pub struct App {
    router: Router,
    state: AppState,
    middlewares: MiddlewareStack,
    max_body_bytes: usize,
    testing: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            state: AppState::new(),
            middlewares: MiddlewareStack::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            testing: false,
        }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn state<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state = self.state.with(value);
        self
    }

    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.add(middleware);
        self
    }

    /// Largest request body the server will buffer.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn testing(mut self, enabled: bool) -> Self {
        self.testing = enabled;
        self
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    /// Serves the application on `addr` until Ctrl-C or SIGTERM.
    pub async fn listen(self, addr: &str) -> io::Result<()> {
        if self.testing {
            tracing::warn!("testing mode is on: panic messages are sent to clients");
        }
        let listener = TcpListener::bind(addr).await?;
        server::serve(self, listener, server::shutdown_signal()).await
    }

    pub(crate) fn into_service(self) -> AppService {
        AppService {
            inner: Arc::new(Inner {
                router: self.router,
                state: Arc::new(self.state),
                middlewares: self.middlewares,
                max_body_bytes: self.max_body_bytes,
                testing: self.testing,
            }),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    router: Router,
    state: Arc<AppState>,
    middlewares: MiddlewareStack,
    max_body_bytes: usize,
    testing: bool,
}

/// A cheaply cloneable handle that dispatches requests into an [`App`].
#[derive(Clone)]
pub(crate) struct AppService {
    inner: Arc<Inner>,
}

impl AppService {
    pub(crate) fn max_body_bytes(&self) -> usize {
        self.inner.max_body_bytes
    }

    /// Dispatches an in-process request. In testing mode a handler panic is
    /// resumed in the caller.
    pub(crate) async fn call(&self, req: Request) -> Response<BoxBody> {
        self.dispatch(req, self.inner.testing).await
    }

    /// Dispatches a request read off a connection. Panics always become a
    /// `500` so the peer gets an answer; testing mode adds the panic text.
    pub(crate) async fn call_from_connection(&self, req: Request) -> Response<BoxBody> {
        self.dispatch(req, false).await
    }

    async fn dispatch(&self, mut req: Request, propagate_panics: bool) -> Response<BoxBody> {
        let ctx = incoming_trace_id(req.headers())
            .map(|id| RequestContext::with_trace_id(id))
            .unwrap_or_default();
        req.extensions_mut().insert(ctx.clone());

        let inner = self.inner.clone();
        let task_ctx = ctx.clone();
        let task = tokio::spawn(async move {
            inner
                .middlewares
                .execute(req, &inner.router, &inner.state, &task_ctx)
                .await
        });

        let reason = match task.await {
            Ok(response) => return response,
            Err(err) if err.is_panic() => {
                let payload = err.into_panic();
                if propagate_panics {
                    std::panic::resume_unwind(payload);
                }
                panic_message(payload.as_ref()).to_string()
            }
            Err(err) => err.to_string(),
        };

        tracing::error!(trace_id = %ctx.trace_id, reason = %reason, "request handler failed");

        let mut error = Error::internal("internal server error").with_trace_id(ctx.trace_id.clone());
        if self.inner.testing {
            error = error.with_details(serde_json::json!({ "reason": reason }));
        }

        let mut response = error.into_response();
        if let Ok(value) = HeaderValue::from_str(&ctx.trace_id) {
            response.headers_mut().insert(TRACE_ID_HEADER, value);
        }
        response
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

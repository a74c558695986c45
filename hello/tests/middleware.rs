//! Trace id propagation and request logging through the default app.

use std::sync::{Arc, Mutex};

use hello::config::Config;
use hello::middleware::{BoxFuture, RequestLogMiddleware, TRACE_ID_HEADER};
use hello::prelude::*;
use hello::testing::TestClient;

#[tokio::test]
async fn test_trace_id_is_generated() {
    let client = TestClient::new(hello::app(&Config::default()));

    let first = client.get("/").send().await;
    let second = client.get("/").send().await;

    let first_id = first.headers()[TRACE_ID_HEADER].to_str().unwrap().to_string();
    let second_id = second.headers()[TRACE_ID_HEADER].to_str().unwrap();

    assert_eq!(first_id.len(), 36);
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn test_incoming_trace_id_is_echoed() {
    let client = TestClient::new(hello::app(&Config::default()));
    let response = client
        .get("/health")
        .header(TRACE_ID_HEADER, "upstream-123")
        .send()
        .await;

    assert_eq!(response.headers()[TRACE_ID_HEADER], "upstream-123");
}

#[tokio::test]
async fn test_handler_sees_incoming_trace_id() {
    let app = App::new()
        .middleware(hello::middleware::TraceIdMiddleware::new())
        .router(Router::new().get("/trace", |req: Request, _, _| async move {
            req.extensions()
                .get::<RequestContext>()
                .map(|ctx| ctx.trace_id.clone())
                .unwrap_or_default()
        }));

    let response = TestClient::new(app)
        .get("/trace")
        .header(TRACE_ID_HEADER, "from-caller")
        .send()
        .await;

    assert_eq!(response.text(), "from-caller");
}

#[tokio::test]
async fn test_request_log_passes_response_through() {
    let app = App::new()
        .middleware(RequestLogMiddleware::new())
        .router(Router::new().get("/", |_, _, _| async { StatusCode::ACCEPTED }));

    let response = TestClient::new(app).get("/").send().await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

struct RecordTraceId(Arc<Mutex<Vec<String>>>);

impl Middleware for RecordTraceId {
    fn handle<'a>(
        &'a self,
        req: Request,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, http::Response<hello::response::BoxBody>> {
        self.0.lock().unwrap().push(ctx.trace_id.clone());
        Box::pin(next.run(req))
    }
}

#[tokio::test]
async fn test_middleware_context_carries_caller_trace_id() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = App::new()
        .middleware(RequestLogMiddleware::new())
        .middleware(RecordTraceId(seen.clone()))
        .router(Router::new().get("/", |_, _, _| async { "Hello" }));
    let client = TestClient::new(app);

    client.get("/").header(TRACE_ID_HEADER, "upstream-3").send().await;
    client.get("/").send().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], "upstream-3");
    assert_eq!(seen[1].len(), 36);
}

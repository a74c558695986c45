use http::header::HeaderValue;
use http::{HeaderMap, Response};

use crate::context::RequestContext;
use crate::response::BoxBody;
use crate::router::Request;

use super::{BoxFuture, Middleware, Next};

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// The caller-supplied trace id, if the header is present and non-empty.
///
/// The app resolves this once per request, before any middleware runs, so
/// every [`RequestContext`] in the chain already carries the caller's id.
pub(crate) fn incoming_trace_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Echoes the request's trace id in the `x-trace-id` response header.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceIdMiddleware;

impl TraceIdMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TraceIdMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let mut response = next.run(req).await;
            if let Ok(value) = HeaderValue::from_str(&ctx.trace_id) {
                response.headers_mut().insert(TRACE_ID_HEADER, value);
            }
            response
        })
    }
}

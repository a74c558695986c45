use http::Response;
use tracing::{Instrument, info, info_span};

use crate::context::RequestContext;
use crate::response::BoxBody;
use crate::router::Request;

use super::{BoxFuture, Middleware, Next};

/// Logs one line per completed request inside a `request` span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            trace_id = %ctx.trace_id,
        );

        Box::pin(
            async move {
                let response = next.run(req).await;
                info!(
                    status = response.status().as_u16(),
                    duration_ms = ctx.elapsed().as_millis() as u64,
                    "request completed"
                );
                response
            }
            .instrument(span),
        )
    }
}

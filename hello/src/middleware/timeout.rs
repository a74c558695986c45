use std::time::Duration;

use http::Response;

use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};
use crate::router::Request;

use super::{BoxFuture, Middleware, Next};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers `504 TIMEOUT` when the rest of the chain takes too long.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    pub(crate) duration: Duration,
}

impl TimeoutMiddleware {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for TimeoutMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Middleware for TimeoutMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            match tokio::time::timeout(self.duration, next.run(req)).await {
                Ok(response) => response,
                Err(_) => {
                    tracing::warn!(timeout_ms = self.duration.as_millis() as u64, "request timed out");
                    Error::timeout("request timed out")
                        .with_trace_id(ctx.trace_id.clone())
                        .into_response()
                }
            }
        })
    }
}

//! Request routing.
//!
//! The [`Router`] keeps routes in insertion order and hands each request to
//! the first route whose method and pattern both match.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Response, StatusCode};

use crate::response::{BoxBody, IntoResponse};
use crate::state::AppState;

/// A fully buffered HTTP request.
pub type Request = http::Request<Bytes>;

/// Values captured by `:name` segments of a route pattern.
pub type PathParams = HashMap<String, String>;

type BoxFuture = Pin<Box<dyn Future<Output = Response<BoxBody>> + Send>>;
type HandlerFn = Box<dyn Fn(Request, PathParams, Arc<AppState>) -> BoxFuture + Send + Sync>;

pub(crate) struct Route {
    pub(crate) pattern: String,
    handler: HandlerFn,
}

/// The HTTP router for matching requests to handlers.
///
/// ```
/// use hello::prelude::*;
///
/// let router = Router::new()
///     .get("/", |_, _, _| async { "Hello!" })
///     .get("/hello/:name", |_, params: PathParams, _| async move {
///         format!("Hello, {}!", params["name"])
///     });
/// ```
pub struct Router {
    pub(crate) routes: Vec<(Method, Route)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route with the given HTTP method and pattern.
    pub fn route<F, Fut, Out>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request, PathParams, Arc<AppState>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler: HandlerFn = Box::new(
            move |req: Request, params: PathParams, state: Arc<AppState>| {
                let fut = handler(req, params, state);
                Box::pin(async move { fut.await.into_response() }) as BoxFuture
            },
        );

        self.routes.push((
            method,
            Route {
                pattern: pattern.to_string(),
                handler,
            },
        ));
        self
    }

    pub fn get<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request, PathParams, Arc<AppState>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request, PathParams, Arc<AppState>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    /// Dispatches `req` to the first matching route, or answers 404.
    pub async fn handle(&self, req: Request, state: &Arc<AppState>) -> Response<BoxBody> {
        let matched = self.routes.iter().find_map(|(method, route)| {
            if method != req.method() {
                return None;
            }
            match_path(&route.pattern, req.uri().path()).map(|params| (route, params))
        });

        match matched {
            Some((route, params)) => (route.handler)(req, params, state.clone()).await,
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches `path` against `pattern`, returning captured `:name` segments.
///
/// Segments are compared and captured exactly as they appear in the URI.
/// Percent-encoding is not decoded, so `/hello/J%C3%B6rg` captures
/// `J%C3%B6rg`.
pub fn match_path(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern_segments: Vec<&str> = pattern.trim_end_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = PathParams::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                if actual.is_empty() {
                    return None;
                }
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected != actual => return None,
            None => {}
        }
    }

    Some(params)
}

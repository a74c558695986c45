//! The greeting application's handlers.

use std::sync::Arc;

use crate::response::Json;
use crate::router::{PathParams, Request, Router};
use crate::state::AppState;

/// Who the home route greets.
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    pub name: String,
}

impl Greeting {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Greeting {
    fn default() -> Self {
        Self::new("World")
    }
}

/// `GET /`
pub async fn home(_req: Request, _params: PathParams, state: Arc<AppState>) -> String {
    let name = state
        .get::<Greeting>()
        .map(|greeting| greeting.name.as_str())
        .unwrap_or("World");
    greet(name)
}

/// `GET /hello/:name`
pub async fn hello(_req: Request, params: PathParams, _state: Arc<AppState>) -> String {
    greet(params.get("name").map(String::as_str).unwrap_or("World"))
}

/// `GET /health`
pub async fn health(_req: Request, _params: PathParams, _state: Arc<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn greet(name: &str) -> String {
    format!("Hello, {}!", name)
}

pub fn router() -> Router {
    Router::new()
        .get("/", home)
        .get("/hello/:name", hello)
        .get("/health", health)
}

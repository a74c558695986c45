//! A small greeting web application.
//!
//! [`app`] builds the application from a [`Config`](config::Config). It can
//! be served over TCP with [`App::listen`](app::App::listen) or driven
//! in-process from tests with [`TestClient`](testing::TestClient).

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod response;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;
pub mod testing;

pub use app::app;

pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{Error, Result};
    pub use crate::middleware::{Middleware, Next};
    pub use crate::observability::TracingConfig;
    pub use crate::response::{IntoResponse, Json};
    pub use crate::router::{PathParams, Request, Router};
    pub use crate::state::AppState;

    pub use http::{Method, StatusCode};
}

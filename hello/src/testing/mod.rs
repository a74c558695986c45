//! Testing utilities.
//!
//! [`TestClient`] drives an [`App`](crate::app::App) in-process: requests go
//! straight into the middleware chain without opening a socket.

mod client;

pub use client::{TestClient, TestRequestBuilder, TestResponse};

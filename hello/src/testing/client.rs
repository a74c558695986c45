//! In-process test client.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use http_body_util::BodyExt;
use serde::{Serialize, de::DeserializeOwned};

use crate::app::{App, AppService};

/// A client that sends simulated requests to an [`App`] without a network.
///
/// Put the app into testing mode first if handler panics should fail the
/// test rather than come back as `500` responses.
///
/// ```
/// use hello::config::Config;
/// use hello::testing::TestClient;
///
/// # tokio_test_block_on(async {
/// let client = TestClient::new(hello::app(&Config::default()).testing(true));
/// let response = client.get("/").send().await;
///
/// assert_eq!(response.status(), 200);
/// assert!(response.body_contains(b"Hello"));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct TestClient {
    service: AppService,
    testing: bool,
}

impl TestClient {
    pub fn new(app: App) -> Self {
        let testing = app.is_testing();
        Self {
            service: app.into_service(),
            testing,
        }
    }

    /// Whether the wrapped app propagates handler panics.
    pub fn is_testing(&self) -> bool {
        self.testing
    }

    pub fn get(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder {
            client: self,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Builder for a single test request.
pub struct TestRequestBuilder<'a> {
    client: &'a TestClient,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl TestRequestBuilder<'_> {
    /// Adds a header. Panics on an invalid name or value.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(
            HeaderName::from_bytes(key.as_bytes()).expect("invalid header name"),
            HeaderValue::from_str(value).expect("invalid header value"),
        );
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).expect("failed to serialize JSON body"));
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    pub fn form<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Bytes::from(
            serde_urlencoded::to_string(body).expect("failed to serialize form body"),
        );
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Dispatches the request and buffers the response.
    pub async fn send(self) -> TestResponse {
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(&self.path)
            .body(self.body)
            .expect("invalid request path");
        *request.headers_mut() = self.headers;

        let response = self.client.service.call(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A buffered response returned by [`TestRequestBuilder::send`].
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether `needle` occurs anywhere in the body. An empty needle always matches.
    pub fn body_contains(&self, needle: &[u8]) -> bool {
        needle.is_empty() || self.body.windows(needle.len()).any(|window| window == needle)
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        self.try_json().expect("response body is not valid JSON")
    }

    pub fn try_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;

    fn echo_app() -> App {
        App::new().router(
            Router::new()
                .post("/echo", |req: crate::router::Request, _, _| async move {
                    let content_type = req
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    let body = String::from_utf8_lossy(req.body()).into_owned();
                    format!("{content_type}|{body}")
                })
                .get("/header", |req: crate::router::Request, _, _| async move {
                    req.headers()
                        .get("x-name")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                }),
        )
    }

    #[tokio::test]
    async fn test_client_json_body() {
        let client = TestClient::new(echo_app());
        let response = client
            .post("/echo")
            .json(&serde_json::json!({"name": "Ferris"}))
            .send()
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text(), r#"application/json|{"name":"Ferris"}"#);
    }

    #[tokio::test]
    async fn test_client_form_body() {
        let client = TestClient::new(echo_app());
        let response = client
            .post("/echo")
            .form(&[("name", "Ferris"), ("kind", "crab")])
            .send()
            .await;

        assert_eq!(
            response.text(),
            "application/x-www-form-urlencoded|name=Ferris&kind=crab"
        );
    }

    #[tokio::test]
    async fn test_client_raw_body_and_header() {
        let client = TestClient::new(echo_app());

        let response = client.post("/echo").body("raw").send().await;
        assert_eq!(response.bytes(), &Bytes::from_static(b"|raw"));

        let response = client.get("/header").header("x-name", "crab").send().await;
        assert_eq!(response.text(), "crab");
    }

    #[tokio::test]
    async fn test_client_put_delete_unrouted() {
        let client = TestClient::new(echo_app());
        assert_eq!(client.put("/echo").send().await.status(), StatusCode::NOT_FOUND);
        assert_eq!(client.delete("/echo").send().await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_client_reports_testing_mode() {
        assert!(TestClient::new(App::new().testing(true)).is_testing());
        assert!(!TestClient::new(App::new()).is_testing());
    }

    #[test]
    fn test_body_contains() {
        let response = TestResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"Hello, World!"),
        };

        assert!(response.body_contains(b"Hello"));
        assert!(response.body_contains(b"World!"));
        assert!(response.body_contains(b""));
        assert!(!response.body_contains(b"hello"));
        assert!(!response.body_contains(b"Hello, World!!"));
    }

    #[test]
    fn test_try_json_rejects_text() {
        let response = TestResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"Hello"),
        };
        assert!(response.try_json::<serde_json::Value>().is_err());
    }
}

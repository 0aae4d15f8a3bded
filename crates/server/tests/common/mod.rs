//! Common test utilities for in-process API testing.
//!
//! The fixture builds the real router with an in-memory object store, a
//! stand-in `convert` script and a local HTTP server for source images, so
//! every request runs the full pipeline without external infrastructure.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use image_pipe_core::{Config, MemoryStoreProvider, PipelineConfig, StorageConfig, TransformConfig};
use image_pipe_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use image_pipe_core::testing::fixtures;

/// Stand-in for `convert`: copies stdin to stdout.
pub const PASSTHROUGH: &str = "exec cat";

/// Stand-in for `convert` rejecting its input.
pub const BROKEN: &str = "cat > /dev/null; echo 'convert: no decode delegate for this image format' >&2; exit 1";

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_resize() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/v1/", json!({
///         "uri": fixture.source_url("cat.png"),
///         "bucket": "b",
///         "key": "cat-thumb.jpg",
///         "width": "200"
///     })).await;
///
///     assert_status!(response, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Destination store; inspect objects written by requests
    pub stores: Arc<MemoryStoreProvider>,
    /// Payload served at `/cat.png` by the source server
    pub image: Vec<u8>,
    /// Base URL of the source server
    pub source_base: String,
    /// Holds the fake transform script
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Body of the `convert` stand-in script
    pub transform_script: String,
    /// Size of the image served at `/cat.png`
    pub image_bytes: usize,
    /// Pipeline deadline
    pub timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            transform_script: PASSTHROUGH.to_string(),
            image_bytes: 256 * 1024,
            timeout_secs: 30,
        }
    }
}

impl TestConfig {
    /// Config whose transform always fails.
    pub fn with_broken_transform() -> Self {
        Self {
            transform_script: BROKEN.to_string(),
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with a passthrough transform.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let program = write_script(&temp_dir, "convert", &test_config.transform_script);

        let image = fixtures::payload(test_config.image_bytes);
        let source_base = serve_source(image.clone()).await;

        let config = Config {
            storage: StorageConfig {
                access_key_id: "test-access-key".to_string(),
                secret_access_key: "test-secret-key".to_string(),
                ..Default::default()
            },
            transform: TransformConfig::with_program(program),
            pipeline: PipelineConfig::default().with_timeout(test_config.timeout_secs),
            ..Default::default()
        };

        let stores = Arc::new(MemoryStoreProvider::new());
        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&stores) as Arc<dyn image_pipe_core::StoreProvider>,
            reqwest::Client::new(),
        ));

        Self {
            router: create_router(state),
            stores,
            image,
            source_base,
            temp_dir,
        }
    }

    /// URL of `path` on the source server.
    pub fn source_url(&self, path: &str) -> String {
        format!("{}/{}", self.source_base, path)
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, Body::empty(), None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let body = Body::from(serde_json::to_vec(&body).unwrap());
        self.request("POST", path, body, Some("application/json"))
            .await
    }

    /// Send a POST request with a raw body.
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Body::from(body.to_string()), Some("application/json"))
            .await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Writes an executable shell script.
pub fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path
}

/// Serves `image` at `/cat.png`; other paths are 404.
async fn serve_source(image: Vec<u8>) -> String {
    let image = Arc::new(image);
    let app = Router::new().route(
        "/cat.png",
        get(move || {
            let image = Arc::clone(&image);
            async move { Vec::clone(&image) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind source server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Source server failed");
    });

    format!("http://{}", addr)
}

/// Assert response status with helpful error message
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $expected:expr) => {
        assert_eq!(
            $response.status.as_u16(),
            $expected,
            "Expected status {}, got {}. Body: {}",
            $expected,
            $response.status.as_u16(),
            $response.text
        );
    };
}

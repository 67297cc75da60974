//! Test harness wiring mock infrastructure into ServerDeps and the router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use server_core::kernel::test_dependencies::TestDependencies;
use server_core::kernel::ServerDeps;
use server_core::server::{build_app, AppState};
use test_context::AsyncTestContext;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-webhook-secret";

/// Mocks plus the ServerDeps built from them.
///
/// `deps` is built once, so every handler call in a test shares one
/// snapshot store and one set of cart locks.
pub struct TestHarness {
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with(TestDependencies::new())
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn with(mocks: TestDependencies) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let deps = mocks.server_deps();
        Self { mocks, deps }
    }

    /// Router guarded by [`TEST_SECRET`]
    pub fn app(&self) -> Router {
        build_app(AppState::new(
            Arc::new(self.deps.clone()),
            Some(TEST_SECRET.to_string()),
        ))
    }

    pub async fn post_webhook(&self, body: Value, secret: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::post("/webhooks/commerce").header("content-type", "application/json");
        if let Some(secret) = secret {
            request = request.header("x-webhook-secret", secret);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        send(self.app(), request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        send(self.app(), request).await
    }
}

/// Drive one request through the router. Empty bodies come back as `Null`.
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

use super::mocks::MockLlmClient;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use rig_deform_gateway::{
    pipeline::Animator,
    server::{self, AppState},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

/// Router wired to `mock`; keep a clone of the mock to inspect requests.
pub fn create_test_app(mock: &MockLlmClient) -> Router {
    let animator = Animator::with_client(Box::new(mock.clone()));
    server::router(AppState::new(animator))
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends `request` and returns the status with the body as text.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Parses the JSON user payload the animator sent to the model.
pub fn sent_payload(mock: &MockLlmClient) -> Value {
    let requests = mock.get_requests();
    let request = requests.last().expect("no request reached the model");
    serde_json::from_str(&request.messages[1].content).unwrap()
}

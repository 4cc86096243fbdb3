use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestApp {
    /// Send a request through the full router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "10.1.2.3")
            .header(header::USER_AGENT, "integration-test");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Start a named session and return its bearer token
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/session",
                None,
                Some(json!({ "username": username })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn setup_game(&self, token: &str, players: &[&str]) -> TestResponse {
        self.send(
            Method::POST,
            "/game/setup",
            Some(token),
            Some(json!({ "players": players })),
        )
        .await
    }

    pub async fn play_round(&self, token: &str, winner: &str, scores: Value) -> TestResponse {
        self.send(
            Method::POST,
            "/game/rounds",
            Some(token),
            Some(json!({ "winner": winner, "scores": scores })),
        )
        .await
    }

    pub async fn current_game(&self, token: &str) -> TestResponse {
        self.send(Method::GET, "/game", Some(token), None).await
    }

    pub async fn end_game(&self, token: &str) -> TestResponse {
        self.send(Method::POST, "/game/end", Some(token), None).await
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }
}

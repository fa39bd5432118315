#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chirpy::{ServerConfig, auth::ServiceKey, create_app, db::Database};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"integration-test-jwt-secret-0123456789";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_dev_mode(true).await
    }

    pub async fn with_dev_mode(dev_mode: bool) -> Self {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let config = ServerConfig {
            db: db.clone(),
            jwt_secret: JWT_SECRET.to_vec(),
            polka_key: ServiceKey::new(POLKA_KEY),
            dev_mode,
        };
        Self {
            app: create_app(&config),
            db,
        }
    }

    /// Send a request and return the status with the parsed JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = authorization {
            builder = builder.header("authorization", auth);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let (status, json) = self
            .send(
                "POST",
                "/api/users",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        json
    }

    /// Login and return the full response body.
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let (status, json) = self
            .send(
                "POST",
                "/api/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    pub async fn create_chirp(&self, access_token: &str, body: &str) -> Value {
        let (status, json) = self
            .send(
                "POST",
                "/api/chirps",
                Some(&bearer(access_token)),
                Some(json!({ "body": body })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        json
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn str_field<'a>(json: &'a Value, field: &str) -> &'a str {
    json[field].as_str().unwrap()
}

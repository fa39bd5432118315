mod common;

use axum::http::StatusCode;
use common::{TestApp, bearer, str_field};
use serde_json::json;

#[tokio::test]
async fn test_reset_in_dev_mode() {
    let app = TestApp::new().await;
    app.register("a@x.com", "pw").await;
    let login = app.login("a@x.com", "pw").await;
    app.create_chirp(str_field(&login, "access_token"), "bye").await;

    let (status, json) = app.send("POST", "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted_users"], 1);

    let (_, list) = app.send("GET", "/api/chirps", None, None).await;
    assert_eq!(list, json!([]));

    // Sessions go with their users
    let (status, _) = app
        .send(
            "POST",
            "/api/refresh",
            Some(&bearer(str_field(&login, "refresh_token"))),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Email is free again
    app.register("a@x.com", "pw").await;
}

#[tokio::test]
async fn test_reset_forbidden_outside_dev_mode() {
    let app = TestApp::with_dev_mode(false).await;
    app.register("a@x.com", "pw").await;

    let (status, json) = app.send("POST", "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["error"].is_string());

    app.login("a@x.com", "pw").await;
}

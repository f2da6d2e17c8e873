use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use trendlog_auth::{AuthError, Authenticator, Credentials, HttpAuthenticator};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}/api/v1/login")
}

fn authenticator(url: String) -> HttpAuthenticator {
    HttpAuthenticator::new(
        reqwest::Client::new(),
        url,
        Credentials::new("ops@example.com", "secret"),
    )
}

#[tokio::test]
async fn login_returns_token_from_data_field() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let captured = seen.clone();
    let router = Router::new().route(
        "/api/v1/login",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                captured.lock().expect("lock").push(body);
                Json(json!({ "data": "token-1" }))
            }
        }),
    );
    let url = spawn(router).await;

    let token = authenticator(url).authenticate().await.expect("token");
    assert_eq!(token.as_str(), "token-1");

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], json!({ "email": "ops@example.com", "password": "secret" }));
}

#[tokio::test]
async fn login_rejected_carries_status_and_body() {
    let router = Router::new().route(
        "/api/v1/login",
        post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
    );
    let url = spawn(router).await;

    let err = authenticator(url).authenticate().await.expect_err("rejected");
    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn login_without_token_is_missing_token() {
    let router = Router::new().route(
        "/api/v1/login",
        post(|| async { Json(json!({ "message": "ok" })) }),
    );
    let url = spawn(router).await;

    let err = authenticator(url).authenticate().await.expect_err("missing");
    assert!(matches!(err, AuthError::MissingToken));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = authenticator(format!("http://{addr}/api/v1/login"))
        .authenticate()
        .await
        .expect_err("transport");
    assert!(matches!(err, AuthError::Transport(_)));
}

#[test]
fn credentials_debug_hides_password() {
    let credentials = Credentials::new("ops@example.com", "secret");
    let rendered = format!("{credentials:?}");
    assert!(rendered.contains("ops@example.com"));
    assert!(!rendered.contains("secret"));
}

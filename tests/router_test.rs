// tests/router_test.rs

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

use finance_tracker::routes;

async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let app = routes::app(common::lazy_state());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(Request::get("/api/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/api/dashboard/evolution"].is_object());
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in [
        "/api/users/me",
        "/api/orders",
        "/api/export/orders.csv",
        "/api/export/clients.csv?status=ATIVO",
    ] {
        let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);

        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "Missing or invalid authentication token.");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected_in_portuguese() {
    let request = Request::post("/api/dashboard/evolution")
        .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
        .header(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "Token de autenticação inválido ou ausente.");
}

//! Health checks and API documentation endpoints.

use axum_test::TestServer;
use culture_finder_api::routes;
use serde_json::Value;

fn server() -> TestServer {
    TestServer::new(routes::create_app(routes::create_app_state())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = server();

    for path in ["/health", "/api/v1/health"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "culture-finder-api");
    }
}

#[tokio::test]
async fn test_openapi_document() {
    let server = server();

    let response = server.get("/api/v1/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert_eq!(doc["info"]["version"], env!("CARGO_PKG_VERSION"));
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/events",
        "/events/{id}/allInfo",
        "/users/authenticate",
        "/lists/events",
        "/assistances",
        "/incidents/filters/users",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(doc["components"]["securitySchemes"]["api_token"].is_object());
}

#[tokio::test]
async fn test_swagger_ui() {
    let server = server();

    let response = server.get("/api/v1/swagger").await;
    response.assert_status_ok();
    assert!(response.text().contains("Culture Finder"));
}

#[tokio::test]
async fn test_unknown_route() {
    let server = server();

    server.get("/api/v1/nothing").await.assert_status_not_found();
}

#[tokio::test]
async fn test_malformed_query_renders_error_body() {
    let server = server();

    let response = server
        .get("/api/v1/events/date")
        .add_query_param("dataIni", "not-a-date")
        .add_query_param("dataFi", "2030-01-01")
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn test_mistyped_json_renders_error_body() {
    let server = server();

    let response = server
        .post("/api/v1/users")
        .json(&serde_json::json!({ "id": 7, "name": "Anna", "birthDate": "1990-01-01" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], 422);
    assert!(body["message"].is_string());
}

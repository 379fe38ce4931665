//! Registration, login sessions and profile routes.

mod common;

use axum::http::StatusCode;
use common::{api_token_header, header_value, spawn_app};
use culture_finder_api::storage::StorageBackend;
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_and_list_users() {
    let app = spawn_app();
    app.register("anna", Some("teatre"), false).await;
    app.register("bernat", None, false).await;

    let response = app.server.get("/api/v1/users").await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 2);
    assert!(page["content"][0].get("id").is_none(), "ids are not exposed");
}

#[tokio::test]
async fn test_register_duplicate_user() {
    let app = spawn_app();
    app.register("anna", None, false).await;

    let response = app
        .server
        .post("/api/v1/users")
        .json(&json!({ "id": "anna", "name": "Anna", "birthDate": "1990-01-01" }))
        .await;
    response.assert_status(StatusCode::NOT_EXTENDED);
    let body: Value = response.json();
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn test_register_without_id() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v1/users")
        .json(&json!({ "name": "Anon", "birthDate": "1990-01-01" }))
        .await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["message"], "User id can not be null");
}

#[tokio::test]
async fn test_register_creates_favourites_list() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .get("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["name"], "Favorits");
}

#[tokio::test]
async fn test_authenticate_unknown_user() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v1/users/authenticate")
        .json(&json!({ "userId": "ghost" }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_authenticate_twice_is_rejected() {
    let app = spawn_app();
    app.user("anna", false).await;

    let response = app
        .server
        .post("/api/v1/users/authenticate")
        .json(&json!({ "userId": "anna" }))
        .await;
    response.assert_status(StatusCode::NOT_EXTENDED);
    let body: Value = response.json();
    assert_eq!(body["message"], "User is already logged in");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = spawn_app();

    let response = app.server.get("/api/v1/users/profile").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/api/v1/users/profile")
        .add_header(api_token_header(), header_value("not-a-token"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_and_edit() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .get("/api/v1/users/profile")
        .add_header(api_token_header(), header_value(&token))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["name"], "User anna");
    assert_eq!(profile["profileImage"], "");

    let response = app
        .server
        .put("/api/v1/users")
        .add_header(api_token_header(), header_value(&token))
        .json(&json!({
            "name": "Anna Puig",
            "birthDate": "1995-04-23",
            "profileImage": "/img/anna.png",
            "preferredCategories": "musica",
            "isAdmin": true
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let profile: Value = response.json();
    assert_eq!(profile["name"], "Anna Puig");
    assert_eq!(profile["isAdmin"], false, "admin flag cannot be self-granted");
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .post("/api/v1/users/logout")
        .add_header(api_token_header(), header_value(&token))
        .await;
    response.assert_status_ok();
    assert!(response.json::<bool>());

    app.server
        .get("/api/v1/users/profile")
        .add_header(api_token_header(), header_value(&token))
        .await
        .assert_status_not_found();

    // A fresh login works again after logout.
    app.login("anna").await;
}

#[tokio::test]
async fn test_delete_user_removes_everything() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .delete("/api/v1/users")
        .add_header(api_token_header(), header_value(&token))
        .await;
    response.assert_status_ok();
    assert!(response.json::<bool>());

    let page: Value = app.server.get("/api/v1/users").await.json();
    assert_eq!(page["totalElements"], 0);
    assert!(app.state.storage.lists_by_user("anna").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notify_all_requires_admin() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    app.server
        .get("/api/v1/users/notifications")
        .add_header(api_token_header(), header_value(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notify_all_reaches_devices() {
    let app = spawn_app();
    let admin = app.user("admin", true).await;
    app.user("anna", false).await;
    app.register("nodevice", None, false).await;
    app.login_with_device("nodevice", None).await;

    let response = app
        .server
        .get("/api/v1/users/notifications")
        .add_header(api_token_header(), header_value(&admin))
        .await;
    response.assert_status_ok();

    let mut devices: Vec<String> = app
        .notifier
        .sent()
        .into_iter()
        .map(|(device, _, _)| device)
        .collect();
    devices.sort();
    assert_eq!(devices, vec!["device-admin", "device-anna"]);
}

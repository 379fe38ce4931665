//! Event list routes.

mod common;

use axum::http::StatusCode;
use common::{TestApp, api_token_header, event_json, header_value, spawn_app};
use serde_json::{Value, json};

async fn create_list(app: &TestApp, token: &str, name: &str) -> i64 {
    let response = app
        .server
        .post("/api/v1/lists")
        .add_header(api_token_header(), header_value(token))
        .add_query_param("name", name)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_list() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .post("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("name", "Estiu")
        .await;
    response.assert_status(StatusCode::CREATED);
    let list: Value = response.json();
    assert_eq!(list["name"], "Estiu");
    assert_eq!(list["userId"], "anna");
    assert_eq!(list["description"], "Llista dels esdeveniments que m'interessen!");
    assert_eq!(list["nEvents"], 0);
}

#[tokio::test]
async fn test_favourites_name_is_reserved() {
    let app = spawn_app();
    let token = app.user("anna", false).await;

    let response = app
        .server
        .post("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("name", "Favorits")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let id = create_list(&app, &token, "Estiu").await;
    let response = app
        .server
        .put("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", id)
        .add_query_param("name", "Favorits")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_edit_list_keeps_fields_left_empty() {
    let app = spawn_app();
    let token = app.user("anna", false).await;
    let id = create_list(&app, &token, "Estiu").await;

    let response = app
        .server
        .put("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", id)
        .add_query_param("name", "")
        .add_query_param("description", "Plans de juliol")
        .await;
    response.assert_status(StatusCode::CREATED);
    let list: Value = response.json();
    assert_eq!(list["name"], "Estiu");
    assert_eq!(list["description"], "Plans de juliol");
}

#[tokio::test]
async fn test_add_and_remove_events() {
    let app = spawn_app();
    let token = app.user("anna", false).await;
    let list_id = create_list(&app, &token, "Estiu").await;
    let event_id = app.create_event(event_json("Concert", "A la platja")).await;

    let response = app
        .server
        .post("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .add_query_param("eventId", event_id)
        .await;
    response.assert_status(StatusCode::CREATED);
    let list: Value = response.json();
    assert_eq!(list["events"], json!([event_id]));
    assert_eq!(list["nEvents"], 1);
    assert_eq!(list["firstImages"], json!(["/img/a.jpg", "/img/b.jpg"]));

    let response = app
        .server
        .post("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .add_query_param("eventId", event_id)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["content"][0]["id"], event_id);

    app.server
        .delete("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .add_query_param("eventId", event_id)
        .await
        .assert_status_ok();

    app.server
        .delete("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .add_query_param("eventId", event_id)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_add_missing_event() {
    let app = spawn_app();
    let token = app.user("anna", false).await;
    let list_id = create_list(&app, &token, "Estiu").await;

    app.server
        .post("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .add_query_param("eventId", 999)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_lists_are_private() {
    let app = spawn_app();
    let owner = app.user("anna", false).await;
    let intruder = app.user("bernat", false).await;
    let list_id = create_list(&app, &owner, "Estiu").await;

    app.server
        .get("/api/v1/lists/events")
        .add_header(api_token_header(), header_value(&intruder))
        .add_query_param("listId", list_id)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete("/api/v1/lists")
        .add_header(api_token_header(), header_value(&intruder))
        .add_query_param("listId", list_id)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_list() {
    let app = spawn_app();
    let token = app.user("anna", false).await;
    let list_id = create_list(&app, &token, "Estiu").await;

    let response = app
        .server
        .delete("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .await;
    response.assert_status_ok();

    app.server
        .delete("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("listId", list_id)
        .await
        .assert_status_not_found();

    let page: Value = app
        .server
        .get("/api/v1/lists")
        .add_header(api_token_header(), header_value(&token))
        .await
        .json();
    assert_eq!(page["totalElements"], 1, "only the favourites list remains");
}

//! Event catalogue routes: creation, searches, tags and ratings.

mod common;

use axum::http::StatusCode;
use common::{api_token_header, event_json, header_value, spawn_app};
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_and_fetch_event() {
    let app = spawn_app();
    let id = app
        .create_event(event_json("Concert de jazz", "Jazz al parc"))
        .await;

    let response = app.server.get(&format!("/api/v1/events/{}/allInfo", id)).await;
    response.assert_status_ok();
    let event: Value = response.json();
    assert_eq!(event["id"], id);
    assert_eq!(event["denominacio"], "Concert de jazz");
    assert_eq!(event["dataInici"], "2099-06-01");
    assert_eq!(event["score"], 0.0);
    assert_eq!(event["numberOfAssistants"], 0);
}

#[tokio::test]
async fn test_duplicate_event_is_rejected() {
    let app = spawn_app();
    app.create_event(event_json("Concert", "Jazz al parc")).await;

    let response = app
        .server
        .post("/api/v1/events")
        .json(&event_json("Concert", "Jazz al parc"))
        .await;
    response.assert_status(StatusCode::NOT_EXTENDED);
    let body: Value = response.json();
    assert_eq!(body["code"], 510);
    assert_eq!(body["message"], "Event already exists");
}

#[tokio::test]
async fn test_create_event_without_name_is_bad_request() {
    let app = spawn_app();
    let mut event = event_json("", "Sense nom");
    event["denominacio"] = Value::Null;

    let response = app.server.post("/api/v1/events").json(&event).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_event_returns_not_found() {
    let app = spawn_app();

    let response = app.server.get("/api/v1/events/42/allInfo").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["message"], "Event not found");

    app.server
        .delete("/api/v1/events/42")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_events_with_pagination() {
    let app = spawn_app();
    for i in 0..3 {
        app.create_event(event_json(&format!("Event {}", i), &format!("Desc {}", i)))
            .await;
    }

    let response = app.server.get("/api/v1/events").await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 3);
    assert_eq!(page["content"].as_array().unwrap().len(), 3);

    let response = app
        .server
        .get("/api/v1/events")
        .add_query_param("enablePagination", true)
        .add_query_param("page", 1)
        .add_query_param("size", 2)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["number"], 1);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(page["last"], true);
}

#[tokio::test]
async fn test_zero_page_size_is_bad_request() {
    let app = spawn_app();

    let response = app
        .server
        .get("/api/v1/events")
        .add_query_param("enablePagination", true)
        .add_query_param("size", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_page_index_is_bad_request() {
    let app = spawn_app();
    app.create_event(event_json("Event", "Desc")).await;

    let response = app
        .server
        .get("/api/v1/events")
        .add_query_param("enablePagination", true)
        .add_query_param("page", u64::MAX)
        .add_query_param("size", 10)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_text_searches_only_return_upcoming_events() {
    let app = spawn_app();
    app.create_event(event_json("Festival de Jazz", "Edicio futura"))
        .await;
    let mut past = event_json("Festival de Jazz antic", "Edicio passada");
    past["dataInici"] = json!("2001-01-01");
    past["dataFi"] = json!("2001-01-02");
    app.create_event(past).await;

    let response = app
        .server
        .get("/api/v1/events/denominacio")
        .add_query_param("denominacio", "Jazz")
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["descripcio"], "Edicio futura");

    let response = app
        .server
        .get("/api/v1/events/descripcio")
        .add_query_param("descripcio", "Edicio")
        .await;
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 0, "description search is exact");
}

#[tokio::test]
async fn test_field_searches() {
    let app = spawn_app();
    app.create_event(event_json("Concert", "Musica al carrer")).await;

    for (path, param, value) in [
        ("ambit", "ambit", "music"),
        ("categoria", "categoria", "concert"),
        ("altres", "altres", "festival"),
        ("preu", "preu", "10"),
        ("comarcaIMunicipi", "comarcaMunicipi", "barcel"),
    ] {
        let response = app
            .server
            .get(&format!("/api/v1/events/{}", path))
            .add_query_param(param, value)
            .await;
        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["totalElements"], 1, "search on {}", path);
    }
}

#[tokio::test]
async fn test_events_between_dates() {
    let app = spawn_app();
    app.create_event(event_json("Dins", "Dins del rang")).await;
    let mut later = event_json("Fora", "Fora del rang");
    later["dataInici"] = json!("2099-09-01");
    later["dataFi"] = json!("2099-09-03");
    app.create_event(later).await;

    let response = app
        .server
        .get("/api/v1/events/date")
        .add_query_param("dataIni", "2099-05-01")
        .add_query_param("dataFi", "2099-07-01")
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["denominacio"], "Dins");
}

#[tokio::test]
async fn test_all_filters_and_distance() {
    let app = spawn_app();
    app.create_event(event_json("Aprop", "Prop de Barcelona")).await;
    let mut far = event_json("Lluny", "Lluny de Barcelona");
    far["latitud"] = json!(42.5);
    far["longitud"] = json!(0.9);
    app.create_event(far).await;

    let response = app
        .server
        .get("/api/v1/events/allFilters")
        .add_query_param("ambit", "musica")
        .add_query_param("radi", 0.1)
        .add_query_param("latitud", 41.4)
        .add_query_param("longitud", 2.2)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["denominacio"], "Aprop");

    let response = app
        .server
        .get("/api/v1/events/distance")
        .add_query_param("radi", 10.0)
        .add_query_param("latitud", 41.4)
        .add_query_param("longitud", 2.2)
        .await;
    let page: Value = response.json();
    assert_eq!(page["totalElements"], 2);
}

#[tokio::test]
async fn test_tags_are_sorted_and_unique() {
    let app = spawn_app();
    app.create_event(event_json("A", "Primer")).await;
    let mut other = event_json("B", "Segon");
    other["ambit"] = json!("teatre");
    other["categoria"] = json!("");
    app.create_event(other).await;

    let response = app.server.get("/api/v1/events/tags").await;
    response.assert_status_ok();
    let tags: Vec<String> = response.json();
    assert_eq!(tags, vec!["concerts", "festivals", "musica", "teatre"]);
}

#[tokio::test]
async fn test_edit_event_by_description() {
    let app = spawn_app();
    let id = app.create_event(event_json("Original", "Descripcio unica")).await;

    let mut edited = event_json("Renamed", "Descripcio unica");
    edited["id"] = Value::Null;
    let response = app.server.put("/api/v1/events").json(&edited).await;
    response.assert_status(StatusCode::CREATED);
    let event: Value = response.json();
    assert_eq!(event["id"], id);
    assert_eq!(event["denominacio"], "Renamed");
}

#[tokio::test]
async fn test_rating_flow() {
    let app = spawn_app();
    let token = app.user("rater", false).await;
    let id = app.create_event(event_json("Obra", "Teatre classic")).await;

    let response = app
        .server
        .post("/api/v1/events/rate")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", id)
        .add_query_param("score", 4.0)
        .await;
    response.assert_status(StatusCode::CREATED);
    let event: Value = response.json();
    assert_eq!(event["score"], 4.0);

    let response = app
        .server
        .post("/api/v1/events/rate")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", id)
        .add_query_param("score", 2.0)
        .await;
    response.assert_status(StatusCode::NOT_EXTENDED);

    let response = app
        .server
        .get("/api/v1/events/rating")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", id)
        .await;
    let score: Option<f32> = response.json();
    assert_eq!(score, Some(4.0));

    app.server
        .delete("/api/v1/events/rate")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", id)
        .await
        .assert_status_ok();

    app.server
        .delete("/api/v1/events/rate")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", id)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_rating_requires_token() {
    let app = spawn_app();
    let id = app.create_event(event_json("Obra", "Sense token")).await;

    let response = app
        .server
        .post("/api/v1/events/rate")
        .add_query_param("eventId", id)
        .add_query_param("score", 3.0)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_suggestions_follow_preferred_categories() {
    let app = spawn_app();
    app.register("fan", Some("teatre,musica"), false).await;
    let token = app.login("fan").await;

    let mut play = event_json("Obra", "Teatre");
    play["ambit"] = json!("teatre");
    play["categoria"] = json!("");
    play["altresCategories"] = json!("");
    app.create_event(play).await;
    app.create_event(event_json("Concert", "Musica")).await;
    let mut other = event_json("Expo", "Art");
    other["ambit"] = json!("exposicions");
    other["categoria"] = json!("art");
    other["altresCategories"] = json!("");
    app.create_event(other).await;

    let response = app
        .server
        .get("/api/v1/events/suggestions")
        .add_header(api_token_header(), header_value(&token))
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    let names: Vec<&str> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["denominacio"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Obra", "Concert"]);
}

#[tokio::test]
async fn test_popularity_orders_by_assistants() {
    let app = spawn_app();
    let quiet = app.create_event(event_json("Tranquil", "Poca gent")).await;
    let busy = app.create_event(event_json("Ple", "Molta gent")).await;
    app.create_event(event_json("Buit", "Ningu")).await;

    for user in ["a", "b"] {
        let token = app.user(user, false).await;
        app.server
            .post("/api/v1/assistances")
            .add_header(api_token_header(), header_value(&token))
            .add_query_param("eventId", busy)
            .await
            .assert_status(StatusCode::CREATED);
    }
    let token = app.user("c", false).await;
    app.server
        .post("/api/v1/assistances")
        .add_header(api_token_header(), header_value(&token))
        .add_query_param("eventId", quiet)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.get("/api/v1/events/popularity").await;
    response.assert_status_ok();
    let page: Value = response.json();
    let content = page["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["id"], busy);
    assert_eq!(content[0]["numberOfAssistants"], 2);
    assert_eq!(content[1]["id"], quiet);
}

#[tokio::test]
async fn test_delete_event() {
    let app = spawn_app();
    let id = app.create_event(event_json("Efimer", "Dura poc")).await;

    let response = app.server.delete(&format!("/api/v1/events/{}", id)).await;
    response.assert_status_ok();
    assert!(response.json::<bool>());

    app.server
        .get(&format!("/api/v1/events/{}/allInfo", id))
        .await
        .assert_status_not_found();
}

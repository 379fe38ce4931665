//! Shared helpers for the route tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use culture_finder_api::routes::{self, AppState};
use culture_finder_api::services::{NotifyError, PushNotifier};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Notification sender that remembers what it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushNotifier for RecordingNotifier {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((
            device_token.to_string(),
            title.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn spawn_app() -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = routes::create_app_state().with_notifier(notifier.clone());
    let server = TestServer::new(routes::create_app(state.clone())).unwrap();
    TestApp {
        server,
        state,
        notifier,
    }
}

pub fn api_token_header() -> HeaderName {
    HeaderName::from_static("api-token")
}

pub fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap()
}

impl TestApp {
    pub async fn register(&self, id: &str, categories: Option<&str>, is_admin: bool) {
        let response = self
            .server
            .post("/api/v1/users")
            .json(&json!({
                "id": id,
                "name": format!("User {}", id),
                "birthDate": "1995-04-23",
                "preferredCategories": categories,
                "isAdmin": is_admin,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    /// Log in and return the API token.
    pub async fn login(&self, id: &str) -> String {
        self.login_with_device(id, Some(&format!("device-{}", id)))
            .await
    }

    pub async fn login_with_device(&self, id: &str, device: Option<&str>) -> String {
        let mut request = self
            .server
            .post("/api/v1/users/authenticate")
            .json(&json!({ "userId": id }));
        if let Some(device) = device {
            request = request.add_header(HeaderName::from_static("devicetoken"), header_value(device));
        }
        let response = request.await;
        response.assert_status_ok();
        response.json::<String>()
    }

    /// Register and log in a user in one step.
    pub async fn user(&self, id: &str, is_admin: bool) -> String {
        self.register(id, None, is_admin).await;
        self.login(id).await
    }

    pub async fn create_event(&self, event: Value) -> i64 {
        let response = self.server.post("/api/v1/events").json(&event).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }
}

/// A valid upcoming event payload.
pub fn event_json(name: &str, description: &str) -> Value {
    json!({
        "dataInici": "2099-06-01",
        "dataFi": "2099-06-02",
        "denominacio": name,
        "descripcio": description,
        "ambit": "musica",
        "categoria": "concerts",
        "altresCategories": "festivals",
        "preu": "10 euros",
        "comarcaIMunicipi": "barcelona",
        "imatges": "/img/a.jpg,/img/b.jpg",
        "latitud": 41.38,
        "longitud": 2.17
    })
}

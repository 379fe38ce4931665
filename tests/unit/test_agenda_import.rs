//! Agenda feed import and the scheduled refresh, against a mocked feed.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use culture_finder_api::models::{Assistance, Session, User};
use culture_finder_api::services::{
    AgendaClient, EventService, NotificationService, NotifyError, PushNotifier, RefreshService,
};
use culture_finder_api::storage::{MemoryStorageBackend, StorageBackend};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const FILTER_PREFIX: &str = "data_inici > '";

/// The `$where` timestamp, when it has the `yyyy-MM-ddTHH:mm:ss.SSS` shape.
fn where_timestamp(request: &Request) -> Option<NaiveDateTime> {
    let (_, condition) = request.url.query_pairs().find(|(key, _)| key == "$where")?;
    let timestamp = condition.strip_prefix(FILTER_PREFIX)?.strip_suffix('\'')?;
    if timestamp.len() != "2030-01-01T00:00:00.000".len() {
        return None;
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.3f").ok()
}

/// Matches feed requests filtered to events starting after a timestamp.
struct UpcomingFilter;

impl Match for UpcomingFilter {
    fn matches(&self, request: &Request) -> bool {
        where_timestamp(request).is_some()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl PushNotifier for RecordingNotifier {
    async fn send(&self, device_token: &str, _title: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(device_token.to_string());
        Ok(())
    }
}

fn feed_body() -> String {
    json!([
        {
            "data_inici": "2030-05-01T00:00:00.000",
            "data_fi": "2030-05-03T00:00:00.000",
            "denominaci": "Festival de Jazz",
            "descripcio": "<p>Tres dies de <b>jazz</b></p>",
            "entrades": "Gratuit",
            "tags_mbits": "agenda:ambits/musica",
            "tags_categor_es": "agenda:categories/festivals-i-mostres,agenda:categories/concerts",
            "imatges": "/img/jazz.jpg",
            "comarca_i_municipi": "agenda:ubicacions/barcelona/barcelones/barcelona",
            "latitud": "41.38",
            "longitud": 2.17
        },
        {
            "data_inici": "2030-06-10T00:00:00.000",
            "data_fi": null,
            "denominaci": "Teatre al carrer",
            "descripcio": "Obra familiar",
            "tags_mbits": "agenda:ambits/teatre"
        }
    ])
    .to_string()
}

struct Harness {
    storage: Arc<dyn StorageBackend>,
    notifier: Arc<RecordingNotifier>,
    refresh: RefreshService,
}

fn harness(server: &MockServer) -> Harness {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorageBackend::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let agenda = AgendaClient::new(
        format!("{}/resource/agenda.json", server.uri()),
        Some("app-token".to_string()),
    )
    .unwrap();
    let refresh = RefreshService::new(
        agenda,
        EventService::new(storage.clone()),
        NotificationService::new(storage.clone(), notifier.clone()),
    );
    Harness {
        storage,
        notifier,
        refresh,
    }
}

async fn mount_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/resource/agenda.json"))
        .and(header("X-App-Token", "app-token"))
        .and(UpcomingFilter)
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_normalises_feed_records() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let agenda = AgendaClient::new(
        format!("{}/resource/agenda.json", server.uri()),
        Some("app-token".to_string()),
    )
    .unwrap();
    let events = agenda.fetch_upcoming().await.unwrap();

    assert_eq!(events.len(), 2);
    let jazz = &events[0];
    assert_eq!(jazz.name, "Festival de Jazz");
    assert_eq!(jazz.description, "Tres dies de jazz");
    assert_eq!(jazz.scope, "musica");
    assert_eq!(jazz.category, "festivals-i-mostres,concerts");
    assert_eq!(jazz.region, "barcelona,barcelona");
    assert_eq!(jazz.price, "Gratuit");
    assert!((jazz.latitude - 41.38).abs() < 1e-4);
    assert!((jazz.longitude - 2.17).abs() < 1e-4);

    let play = &events[1];
    assert_eq!(play.end_date, NaiveDate::from_ymd_opt(9999, 9, 9).unwrap());
    assert_eq!(play.region, "");
}

#[tokio::test]
async fn test_import_skips_known_events() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    let h = harness(&server);

    let (imported, skipped) = h.refresh.import_events().await.unwrap();
    assert_eq!((imported, skipped), (2, 0));

    let (imported, skipped) = h.refresh.import_events().await.unwrap();
    assert_eq!((imported, skipped), (0, 2));

    let page = h
        .storage
        .search_events(&Default::default(), None)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 2);
}

#[tokio::test]
async fn test_feed_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let h = harness(&server);

    assert!(h.refresh.import_events().await.is_err());
}

#[tokio::test]
async fn test_run_once_notifies_attendees_of_tomorrow() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    let h = harness(&server);

    for id in ["anna", "bernat"] {
        h.storage
            .insert_user(&User {
                id: id.to_string(),
                name: id.to_string(),
                birth_date: "2000-01-01".to_string(),
                profile_image: None,
                preferred_categories: None,
                is_admin: false,
            })
            .await
            .unwrap();
        h.storage
            .insert_session(&Session {
                user_id: id.to_string(),
                token: format!("token-{}", id),
                device_token: Some(format!("device-{}", id)),
            })
            .await
            .unwrap();
    }

    let report = h.refresh.run_once(NaiveDate::from_ymd_opt(2030, 4, 30).unwrap()).await;
    assert_eq!(report.imported, 2);
    assert_eq!(report.notified, 0);

    // The jazz festival starts on 2030-05-01.
    h.storage
        .insert_assistance(&Assistance {
            user_id: "anna".to_string(),
            event_id: 1,
        })
        .await
        .unwrap();

    let report = h.refresh.run_once(NaiveDate::from_ymd_opt(2030, 4, 30).unwrap()).await;
    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.notified, 1);
    assert_eq!(*h.notifier.sent.lock().unwrap(), vec!["device-anna".to_string()]);
}

#[tokio::test]
async fn test_run_once_survives_feed_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let h = harness(&server);

    let report = h.refresh.run_once(NaiveDate::from_ymd_opt(2030, 4, 30).unwrap()).await;
    assert_eq!(report.imported, 0);
    assert_eq!(report.notified, 0);
}

#[tokio::test]
async fn test_fetch_filters_on_current_time() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let agenda = AgendaClient::new(
        format!("{}/resource/agenda.json", server.uri()),
        Some("app-token".to_string()),
    )
    .unwrap();
    let before = Local::now().naive_local();
    agenda.fetch_upcoming().await.unwrap();
    let after = Local::now().naive_local();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let since = where_timestamp(&requests[0]).expect("timestamp filter");
    assert!(since >= before - chrono::Duration::milliseconds(1));
    assert!(since <= after);
}

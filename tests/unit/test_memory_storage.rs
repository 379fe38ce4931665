//! In-memory storage backend behaviour.

use chrono::NaiveDate;
use culture_finder_api::models::{
    Assistance, EventDetails, EventFilter, GeoArea, IncidentFilter, NewIncident, PageRequest,
    Session, TextMatch, User,
};
use culture_finder_api::storage::{MemoryStorageBackend, StorageBackend, StorageError};

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn details(name: &str, start: &str) -> EventDetails {
    EventDetails {
        start_date: date(start),
        end_date: date(start),
        name: name.to_string(),
        description: format!("{} description", name),
        scope: "musica".to_string(),
        category: "concerts".to_string(),
        latitude: 41.38,
        longitude: 2.17,
        ..Default::default()
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: id.to_string(),
        birth_date: "2000-01-01".to_string(),
        profile_image: None,
        preferred_categories: None,
        is_admin: false,
    }
}

#[tokio::test]
async fn test_users_and_sessions() {
    let storage = MemoryStorageBackend::new();
    storage.insert_user(&user("anna")).await.unwrap();

    let duplicate = storage.insert_user(&user("anna")).await;
    assert!(matches!(duplicate, Err(StorageError::AlreadyExists { .. })));

    let session = Session {
        user_id: "anna".to_string(),
        token: "token-1".to_string(),
        device_token: Some("device".to_string()),
    };
    storage.insert_session(&session).await.unwrap();
    assert!(storage.insert_session(&session).await.is_err());
    assert_eq!(
        storage.get_session_by_token("token-1").await.unwrap(),
        Some(session)
    );

    assert!(storage.delete_session("anna").await.unwrap());
    assert!(!storage.delete_session("anna").await.unwrap());
    assert!(storage.get_session_by_token("token-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_event_ids_are_sequential_and_occurrences_detected() {
    let storage = MemoryStorageBackend::new();
    let first = storage.insert_event(&details("A", "2030-01-01")).await.unwrap();
    let second = storage.insert_event(&details("B", "2030-01-01")).await.unwrap();
    assert_eq!(second.id, first.id + 1);

    assert!(storage
        .event_occurrence_exists(&details("A", "2030-01-01"))
        .await
        .unwrap());
    assert!(!storage
        .event_occurrence_exists(&details("A", "2030-01-02"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_search_filters_and_pages() {
    let storage = MemoryStorageBackend::new();
    storage.insert_event(&details("Jazz nit", "2030-01-01")).await.unwrap();
    storage.insert_event(&details("Jazz dia", "2030-02-01")).await.unwrap();
    storage.insert_event(&details("Rock", "2031-01-01")).await.unwrap();

    let filter = EventFilter {
        name: Some(TextMatch::Contains("Jazz".to_string())),
        ..Default::default()
    };
    let page = storage.search_events(&filter, None).await.unwrap();
    assert_eq!(page.total_elements, 2);

    let filter = EventFilter {
        starts_on_or_after: Some(date("2030-01-15")),
        ends_on_or_before: Some(date("2030-12-31")),
        ..Default::default()
    };
    let page = storage.search_events(&filter, None).await.unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].details.name, "Jazz dia");

    let filter = EventFilter {
        area: Some(GeoArea {
            latitude: 0.0,
            longitude: 0.0,
            radius: 1.0,
        }),
        ..Default::default()
    };
    assert!(storage.search_events(&filter, None).await.unwrap().empty);

    let request = Some(PageRequest { page: 1, size: 2 });
    let page = storage
        .search_events(&EventFilter::default(), request)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].details.name, "Rock");
}

#[tokio::test]
async fn test_event_stats() {
    let storage = MemoryStorageBackend::new();
    let event = storage.insert_event(&details("A", "2030-01-01")).await.unwrap();
    storage.insert_rating(event.id, "anna", 4.0).await.unwrap();
    storage.insert_rating(event.id, "bernat", 2.0).await.unwrap();
    assert!(matches!(
        storage.insert_rating(event.id, "anna", 1.0).await,
        Err(StorageError::AlreadyExists { .. })
    ));
    storage
        .insert_assistance(&Assistance {
            user_id: "anna".to_string(),
            event_id: event.id,
        })
        .await
        .unwrap();

    let stats = storage.event_stats(&[event.id, 99]).await.unwrap();
    assert_eq!(stats[&event.id].score, 3.0);
    assert_eq!(stats[&event.id].assistants, 1);
    assert_eq!(stats[&99].score, 0.0);
}

#[tokio::test]
async fn test_delete_event_cascades() {
    let storage = MemoryStorageBackend::new();
    let event = storage.insert_event(&details("A", "2030-01-01")).await.unwrap();
    let list = storage.insert_list("anna", "Estiu", "desc").await.unwrap();
    storage.add_event_to_list(list.id, event.id).await.unwrap();
    storage.insert_rating(event.id, "anna", 5.0).await.unwrap();
    let assistance = Assistance {
        user_id: "anna".to_string(),
        event_id: event.id,
    };
    storage.insert_assistance(&assistance).await.unwrap();
    storage
        .insert_incident(&NewIncident {
            user_id: "anna".to_string(),
            event_id: event.id,
            description: Some("wrong".to_string()),
            response: None,
            is_resolved: false,
        })
        .await
        .unwrap();

    assert!(storage.delete_event(event.id).await.unwrap());
    assert!(!storage.delete_event(event.id).await.unwrap());

    assert!(storage.get_list(list.id).await.unwrap().unwrap().events.is_empty());
    assert!(storage.get_rating(event.id, "anna").await.unwrap().is_none());
    assert!(!storage.assistance_exists(&assistance).await.unwrap());
    let incidents = storage
        .search_incidents(&IncidentFilter::default())
        .await
        .unwrap();
    assert!(incidents.is_empty());
}

#[tokio::test]
async fn test_popularity_and_attendees() {
    let storage = MemoryStorageBackend::new();
    let quiet = storage.insert_event(&details("A", "2030-01-01")).await.unwrap();
    let busy = storage.insert_event(&details("B", "2030-01-02")).await.unwrap();
    for (user_id, event_id) in [("anna", busy.id), ("bernat", busy.id), ("carla", quiet.id)] {
        storage
            .insert_assistance(&Assistance {
                user_id: user_id.to_string(),
                event_id,
            })
            .await
            .unwrap();
    }

    assert_eq!(
        storage.popular_event_ids().await.unwrap(),
        vec![busy.id, quiet.id]
    );
    assert_eq!(
        storage
            .attendees_of_events_starting(date("2030-01-02"))
            .await
            .unwrap(),
        vec!["anna".to_string(), "bernat".to_string()]
    );
}

#[tokio::test]
async fn test_list_membership() {
    let storage = MemoryStorageBackend::new();
    let list = storage.insert_list("anna", "Estiu", "desc").await.unwrap();
    storage.add_event_to_list(list.id, 1).await.unwrap();
    assert!(matches!(
        storage.add_event_to_list(list.id, 1).await,
        Err(StorageError::AlreadyExists { .. })
    ));
    assert!(matches!(
        storage.add_event_to_list(999, 1).await,
        Err(StorageError::NotFound { .. })
    ));

    assert!(storage.remove_event_from_list(list.id, 1).await.unwrap());
    assert!(!storage.remove_event_from_list(list.id, 1).await.unwrap());
    assert_eq!(storage.delete_lists_by_user("anna").await.unwrap(), 1);
}

#[tokio::test]
async fn test_incident_filters() {
    let storage = MemoryStorageBackend::new();
    for (user_id, event_id, resolved) in [("anna", 1, false), ("anna", 2, true), ("bernat", 1, false)]
    {
        storage
            .insert_incident(&NewIncident {
                user_id: user_id.to_string(),
                event_id,
                description: None,
                response: None,
                is_resolved: resolved,
            })
            .await
            .unwrap();
    }

    let by_user = IncidentFilter {
        user_id: Some("anna".to_string()),
        ..Default::default()
    };
    assert_eq!(storage.search_incidents(&by_user).await.unwrap().len(), 2);

    let open_on_event = IncidentFilter {
        event_id: Some(1),
        resolved: Some(false),
        ..Default::default()
    };
    assert_eq!(storage.search_incidents(&open_on_event).await.unwrap().len(), 2);

    assert_eq!(storage.delete_incidents(&by_user).await.unwrap(), 2);
    assert_eq!(
        storage
            .search_incidents(&IncidentFilter::default())
            .await
            .unwrap()
            .len(),
        1
    );
}

//! Storage trait definitions for the API storage backends.

use super::StorageError;
use crate::models::{
    Assistance, Event, EventDetails, EventFilter, EventList, EventStats, Incident,
    IncidentFilter, NewIncident, Page, PageRequest, Session, User,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Storage backend trait for database operations
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    // Users

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Insert a user, failing with `AlreadyExists` on a taken id
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Replace a user's fields, failing with `NotFound` if absent
    async fn update_user(&self, user: &User) -> Result<(), StorageError>;

    async fn delete_user(&self, user_id: &str) -> Result<bool, StorageError>;

    // Sessions

    async fn get_session_by_user(&self, user_id: &str) -> Result<Option<Session>, StorageError>;

    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, StorageError>;

    /// Insert a session, failing with `AlreadyExists` if the user has one
    async fn insert_session(&self, session: &Session) -> Result<(), StorageError>;

    async fn delete_session(&self, user_id: &str) -> Result<bool, StorageError>;

    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError>;

    // Events

    async fn insert_event(&self, details: &EventDetails) -> Result<Event, StorageError>;

    /// Replace an event's fields, returning `None` if absent
    async fn update_event(
        &self,
        event_id: i64,
        details: &EventDetails,
    ) -> Result<Option<Event>, StorageError>;

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, StorageError>;

    /// Events with the given ids, in the order of `event_ids`; unknown ids are skipped
    async fn get_events(&self, event_ids: &[i64]) -> Result<Vec<Event>, StorageError>;

    /// Whether an event with the same dates, name and description exists
    async fn event_occurrence_exists(&self, details: &EventDetails) -> Result<bool, StorageError>;

    /// Events matching a filter ordered by id, optionally windowed
    async fn search_events(
        &self,
        filter: &EventFilter,
        page: Option<PageRequest>,
    ) -> Result<Page<Event>, StorageError>;

    /// Raw scope, category and other-category values of every event
    async fn list_tag_fields(&self) -> Result<Vec<String>, StorageError>;

    /// Delete an event with its ratings, assistances, incidents and list entries
    async fn delete_event(&self, event_id: i64) -> Result<bool, StorageError>;

    /// Mean score and assistance count for each requested event
    async fn event_stats(&self, event_ids: &[i64]) -> Result<HashMap<i64, EventStats>, StorageError>;

    // Ratings

    async fn get_rating(&self, event_id: i64, user_id: &str) -> Result<Option<f32>, StorageError>;

    /// Insert a rating, failing with `AlreadyExists` if the user already rated
    async fn insert_rating(
        &self,
        event_id: i64,
        user_id: &str,
        score: f32,
    ) -> Result<(), StorageError>;

    async fn delete_rating(&self, event_id: i64, user_id: &str) -> Result<bool, StorageError>;

    async fn delete_ratings_by_user(&self, user_id: &str) -> Result<u64, StorageError>;

    // Assistances

    /// Insert an assistance, failing with `AlreadyExists` on duplicates
    async fn insert_assistance(&self, assistance: &Assistance) -> Result<(), StorageError>;

    async fn assistance_exists(&self, assistance: &Assistance) -> Result<bool, StorageError>;

    async fn delete_assistance(&self, assistance: &Assistance) -> Result<bool, StorageError>;

    async fn delete_assistances_by_user(&self, user_id: &str) -> Result<u64, StorageError>;

    /// Ids of the events a user attends, ordered by event id
    async fn attended_event_ids(&self, user_id: &str) -> Result<Vec<i64>, StorageError>;

    /// Ids of attended events, most attended first
    async fn popular_event_ids(&self) -> Result<Vec<i64>, StorageError>;

    /// Distinct users attending an event that starts on `date`
    async fn attendees_of_events_starting(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, StorageError>;

    // Lists

    async fn insert_list(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<EventList, StorageError>;

    async fn get_list(&self, list_id: i64) -> Result<Option<EventList>, StorageError>;

    /// A user's lists ordered by id
    async fn lists_by_user(&self, user_id: &str) -> Result<Vec<EventList>, StorageError>;

    /// Update name and description, failing with `NotFound` if absent
    async fn update_list(&self, list: &EventList) -> Result<(), StorageError>;

    /// Append an event, failing with `AlreadyExists` if present
    async fn add_event_to_list(&self, list_id: i64, event_id: i64) -> Result<(), StorageError>;

    async fn remove_event_from_list(&self, list_id: i64, event_id: i64)
    -> Result<bool, StorageError>;

    async fn delete_list(&self, list_id: i64) -> Result<bool, StorageError>;

    async fn delete_lists_by_user(&self, user_id: &str) -> Result<u64, StorageError>;

    // Incidents

    async fn insert_incident(&self, incident: &NewIncident) -> Result<Incident, StorageError>;

    async fn get_incident(&self, incident_id: i64) -> Result<Option<Incident>, StorageError>;

    /// Replace an incident, failing with `NotFound` if absent
    async fn update_incident(&self, incident: &Incident) -> Result<(), StorageError>;

    async fn delete_incident(&self, incident_id: i64) -> Result<bool, StorageError>;

    /// Incidents matching a filter ordered by id
    async fn search_incidents(&self, filter: &IncidentFilter)
    -> Result<Vec<Incident>, StorageError>;

    async fn delete_incidents(&self, filter: &IncidentFilter) -> Result<u64, StorageError>;
}

//! In-memory storage backend.
//!
//! Used when no `DATABASE_URL` is configured and by the test suites. All
//! collections live behind one lock so cascading deletes stay consistent.

use super::{StorageError, traits::StorageBackend};
use crate::models::{
    Assistance, Event, EventDetails, EventFilter, EventList, EventStats, Incident,
    IncidentFilter, NewIncident, Page, PageRequest, Session, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<String, User>,
    /// Keyed by user id
    sessions: BTreeMap<String, Session>,
    events: BTreeMap<i64, EventDetails>,
    ratings: BTreeMap<(i64, String), f32>,
    /// (user id, event id)
    assistances: BTreeSet<(String, i64)>,
    lists: BTreeMap<i64, EventList>,
    incidents: BTreeMap<i64, Incident>,
    last_event_id: i64,
    last_list_id: i64,
    last_incident_id: i64,
}

/// Storage backend keeping everything in process memory.
#[derive(Default)]
pub struct MemoryStorageBackend {
    state: RwLock<MemoryState>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_event(id: i64, details: &EventDetails) -> Event {
    Event {
        id,
        details: details.clone(),
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(StorageError::already_exists("user", &user.id));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("user", &user.id)),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, StorageError> {
        Ok(self.state.write().await.users.remove(user_id).is_some())
    }

    async fn get_session_by_user(&self, user_id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self.state.read().await.sessions.get(user_id).cloned())
    }

    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.user_id) {
            return Err(StorageError::already_exists("session", &session.user_id));
        }
        state
            .sessions
            .insert(session.user_id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<bool, StorageError> {
        Ok(self.state.write().await.sessions.remove(user_id).is_some())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        Ok(self.state.read().await.sessions.values().cloned().collect())
    }

    async fn insert_event(&self, details: &EventDetails) -> Result<Event, StorageError> {
        let mut state = self.state.write().await;
        state.last_event_id += 1;
        let id = state.last_event_id;
        state.events.insert(id, details.clone());
        Ok(to_event(id, details))
    }

    async fn update_event(
        &self,
        event_id: i64,
        details: &EventDetails,
    ) -> Result<Option<Event>, StorageError> {
        let mut state = self.state.write().await;
        Ok(state.events.get_mut(&event_id).map(|existing| {
            *existing = details.clone();
            to_event(event_id, details)
        }))
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, StorageError> {
        let state = self.state.read().await;
        Ok(state.events.get(&event_id).map(|d| to_event(event_id, d)))
    }

    async fn get_events(&self, event_ids: &[i64]) -> Result<Vec<Event>, StorageError> {
        let state = self.state.read().await;
        Ok(event_ids
            .iter()
            .filter_map(|id| state.events.get(id).map(|d| to_event(*id, d)))
            .collect())
    }

    async fn event_occurrence_exists(&self, details: &EventDetails) -> Result<bool, StorageError> {
        let state = self.state.read().await;
        Ok(state.events.values().any(|e| e.same_occurrence(details)))
    }

    async fn search_events(
        &self,
        filter: &EventFilter,
        page: Option<PageRequest>,
    ) -> Result<Page<Event>, StorageError> {
        let state = self.state.read().await;
        let matching: Vec<Event> = state
            .events
            .iter()
            .filter(|(_, details)| filter.matches(details))
            .map(|(id, details)| to_event(*id, details))
            .collect();
        Ok(Page::paginate(matching, page))
    }

    async fn list_tag_fields(&self) -> Result<Vec<String>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .values()
            .flat_map(|e| e.tag_fields().map(str::to_string))
            .collect())
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        if state.events.remove(&event_id).is_none() {
            return Ok(false);
        }
        state.ratings.retain(|(e, _), _| *e != event_id);
        state.assistances.retain(|(_, e)| *e != event_id);
        state.incidents.retain(|_, i| i.event_id != event_id);
        for list in state.lists.values_mut() {
            list.events.retain(|e| *e != event_id);
        }
        Ok(true)
    }

    async fn event_stats(
        &self,
        event_ids: &[i64],
    ) -> Result<HashMap<i64, EventStats>, StorageError> {
        let state = self.state.read().await;
        let stats = event_ids
            .iter()
            .map(|id| {
                let scores: Vec<f32> = state
                    .ratings
                    .iter()
                    .filter(|((e, _), _)| e == id)
                    .map(|(_, score)| *score)
                    .collect();
                let score = if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f32>() / scores.len() as f32
                };
                let assistants = state.assistances.iter().filter(|(_, e)| e == id).count() as i64;
                (*id, EventStats { score, assistants })
            })
            .collect();
        Ok(stats)
    }

    async fn get_rating(&self, event_id: i64, user_id: &str) -> Result<Option<f32>, StorageError> {
        let state = self.state.read().await;
        Ok(state.ratings.get(&(event_id, user_id.to_string())).copied())
    }

    async fn insert_rating(
        &self,
        event_id: i64,
        user_id: &str,
        score: f32,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let key = (event_id, user_id.to_string());
        if state.ratings.contains_key(&key) {
            return Err(StorageError::already_exists(
                "rating",
                format!("{}/{}", event_id, user_id),
            ));
        }
        state.ratings.insert(key, score);
        Ok(())
    }

    async fn delete_rating(&self, event_id: i64, user_id: &str) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        Ok(state
            .ratings
            .remove(&(event_id, user_id.to_string()))
            .is_some())
    }

    async fn delete_ratings_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.ratings.len();
        state.ratings.retain(|(_, u), _| u != user_id);
        Ok((before - state.ratings.len()) as u64)
    }

    async fn insert_assistance(&self, assistance: &Assistance) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let key = (assistance.user_id.clone(), assistance.event_id);
        if !state.assistances.insert(key) {
            return Err(StorageError::already_exists(
                "assistance",
                format!("{}/{}", assistance.user_id, assistance.event_id),
            ));
        }
        Ok(())
    }

    async fn assistance_exists(&self, assistance: &Assistance) -> Result<bool, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .assistances
            .contains(&(assistance.user_id.clone(), assistance.event_id)))
    }

    async fn delete_assistance(&self, assistance: &Assistance) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        Ok(state
            .assistances
            .remove(&(assistance.user_id.clone(), assistance.event_id)))
    }

    async fn delete_assistances_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.assistances.len();
        state.assistances.retain(|(u, _)| u != user_id);
        Ok((before - state.assistances.len()) as u64)
    }

    async fn attended_event_ids(&self, user_id: &str) -> Result<Vec<i64>, StorageError> {
        let state = self.state.read().await;
        let ids: BTreeSet<i64> = state
            .assistances
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, e)| *e)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn popular_event_ids(&self) -> Result<Vec<i64>, StorageError> {
        let state = self.state.read().await;
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for (_, event_id) in &state.assistances {
            *counts.entry(*event_id).or_default() += 1;
        }
        let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked.into_iter().map(|(id, _)| id).collect())
    }

    async fn attendees_of_events_starting(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, StorageError> {
        let state = self.state.read().await;
        let users: BTreeSet<String> = state
            .assistances
            .iter()
            .filter(|(_, e)| {
                state
                    .events
                    .get(e)
                    .is_some_and(|event| event.start_date == date)
            })
            .map(|(u, _)| u.clone())
            .collect();
        Ok(users.into_iter().collect())
    }

    async fn insert_list(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<EventList, StorageError> {
        let mut state = self.state.write().await;
        state.last_list_id += 1;
        let list = EventList {
            id: state.last_list_id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            events: Vec::new(),
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn get_list(&self, list_id: i64) -> Result<Option<EventList>, StorageError> {
        Ok(self.state.read().await.lists.get(&list_id).cloned())
    }

    async fn lists_by_user(&self, user_id: &str) -> Result<Vec<EventList>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_list(&self, list: &EventList) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let existing = state
            .lists
            .get_mut(&list.id)
            .ok_or_else(|| StorageError::not_found("list", list.id))?;
        existing.name = list.name.clone();
        existing.description = list.description.clone();
        Ok(())
    }

    async fn add_event_to_list(&self, list_id: i64, event_id: i64) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let list = state
            .lists
            .get_mut(&list_id)
            .ok_or_else(|| StorageError::not_found("list", list_id))?;
        if list.contains(event_id) {
            return Err(StorageError::already_exists(
                "list event",
                format!("{}/{}", list_id, event_id),
            ));
        }
        list.events.push(event_id);
        Ok(())
    }

    async fn remove_event_from_list(
        &self,
        list_id: i64,
        event_id: i64,
    ) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        let Some(list) = state.lists.get_mut(&list_id) else {
            return Ok(false);
        };
        let before = list.events.len();
        list.events.retain(|e| *e != event_id);
        Ok(list.events.len() != before)
    }

    async fn delete_list(&self, list_id: i64) -> Result<bool, StorageError> {
        Ok(self.state.write().await.lists.remove(&list_id).is_some())
    }

    async fn delete_lists_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.lists.len();
        state.lists.retain(|_, l| l.user_id != user_id);
        Ok((before - state.lists.len()) as u64)
    }

    async fn insert_incident(&self, incident: &NewIncident) -> Result<Incident, StorageError> {
        let mut state = self.state.write().await;
        state.last_incident_id += 1;
        let stored = Incident {
            id: state.last_incident_id,
            user_id: incident.user_id.clone(),
            event_id: incident.event_id,
            description: incident.description.clone(),
            response: incident.response.clone(),
            is_resolved: incident.is_resolved,
        };
        state.incidents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_incident(&self, incident_id: i64) -> Result<Option<Incident>, StorageError> {
        Ok(self.state.read().await.incidents.get(&incident_id).cloned())
    }

    async fn update_incident(&self, incident: &Incident) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.incidents.get_mut(&incident.id) {
            Some(existing) => {
                *existing = incident.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("incident", incident.id)),
        }
    }

    async fn delete_incident(&self, incident_id: i64) -> Result<bool, StorageError> {
        Ok(self
            .state
            .write()
            .await
            .incidents
            .remove(&incident_id)
            .is_some())
    }

    async fn search_incidents(
        &self,
        filter: &IncidentFilter,
    ) -> Result<Vec<Incident>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .incidents
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect())
    }

    async fn delete_incidents(&self, filter: &IncidentFilter) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.incidents.len();
        state.incidents.retain(|_, i| !filter.matches(i));
        Ok((before - state.incidents.len()) as u64)
    }
}

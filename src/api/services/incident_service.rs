//! Incident reports about events.
//!
//! Admins see and manage every incident. Other users are restricted to the
//! incidents they filed.

use super::error::{ServiceError, ServiceResult};
use crate::models::{
    Incident, IncidentDto, IncidentFilter, Page, PageRequest, SubmitIncidentDto, User,
};
use crate::storage::StorageBackend;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct IncidentService {
    storage: Arc<dyn StorageBackend>,
}

impl IncidentService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    async fn caller(&self, user_id: &str) -> ServiceResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    async fn require_event(&self, event_id: i64) -> ServiceResult<()> {
        match self.storage.get_event(event_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("Event not found")),
        }
    }

    async fn find(&self, filter: &IncidentFilter) -> ServiceResult<Vec<IncidentDto>> {
        let incidents = self.storage.search_incidents(filter).await?;
        Ok(incidents.into_iter().map(IncidentDto::from).collect())
    }

    pub async fn by_user(
        &self,
        caller_id: &str,
        user_id: &str,
        resolved: Option<bool>,
    ) -> ServiceResult<Vec<IncidentDto>> {
        let caller = self.caller(caller_id).await?;
        if !caller.is_admin && caller.id != user_id {
            return Err(ServiceError::permission_denied(
                "You are not allowed to see these incidents",
            ));
        }
        let filter = IncidentFilter {
            user_id: Some(user_id.to_string()),
            resolved,
            ..Default::default()
        };
        self.find(&filter).await
    }

    /// Incidents of an event; `event_id == 0` means every event. Non-admins
    /// only get their own.
    pub async fn by_event(
        &self,
        caller_id: &str,
        event_id: i64,
        resolved: Option<bool>,
    ) -> ServiceResult<Vec<IncidentDto>> {
        let caller = self.caller(caller_id).await?;
        let filter = IncidentFilter {
            user_id: (!caller.is_admin).then(|| caller.id.clone()),
            event_id: (event_id != 0).then_some(event_id),
            resolved,
        };
        self.find(&filter).await
    }

    pub async fn list(
        &self,
        caller_id: &str,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<IncidentDto>> {
        let caller = self.caller(caller_id).await?;
        let filter = IncidentFilter {
            user_id: (!caller.is_admin).then_some(caller.id),
            ..Default::default()
        };
        Ok(Page::paginate(self.find(&filter).await?, page))
    }

    pub async fn delete(&self, caller_id: &str, incident_id: i64) -> ServiceResult<bool> {
        let caller = self.caller(caller_id).await?;
        let incident = self
            .storage
            .get_incident(incident_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Incident not found"))?;
        if !caller.is_admin && incident.user_id != caller.id {
            return Err(ServiceError::permission_denied(
                "You are not allowed to delete this incident",
            ));
        }
        self.storage.delete_incident(incident_id).await?;
        info!("Deleted incident {}", incident_id);
        Ok(true)
    }

    /// Delete the incidents of an event visible to the caller. Returns
    /// whether none of them remain.
    pub async fn delete_for_event(&self, caller_id: &str, event_id: i64) -> ServiceResult<bool> {
        let caller = self.caller(caller_id).await?;
        self.require_event(event_id).await?;
        let filter = IncidentFilter {
            user_id: (!caller.is_admin).then(|| caller.id.clone()),
            event_id: Some(event_id),
            ..Default::default()
        };
        let deleted = self.storage.delete_incidents(&filter).await?;
        if caller.is_admin && deleted == 0 {
            return Err(ServiceError::not_found("There are no incidents for this event"));
        }
        info!("Deleted {} incidents of event {}", deleted, event_id);
        Ok(self.storage.search_incidents(&filter).await?.is_empty())
    }

    pub async fn submit(
        &self,
        caller_id: &str,
        dto: SubmitIncidentDto,
    ) -> ServiceResult<IncidentDto> {
        self.caller(caller_id).await?;
        self.require_event(dto.event_id).await?;
        let incident = self
            .storage
            .insert_incident(&dto.into_new_incident(caller_id.to_string()))
            .await?;
        info!(
            "User {} reported incident {} on event {}",
            caller_id, incident.id, incident.event_id
        );
        Ok(incident.into())
    }

    pub async fn edit(&self, caller_id: &str, dto: IncidentDto) -> ServiceResult<IncidentDto> {
        let caller = self.caller(caller_id).await?;
        let current = self
            .storage
            .get_incident(dto.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Incident not found"))?;
        // Only admins may reassign an incident to another reporter.
        if !caller.is_admin && (current.user_id != caller.id || dto.user_id != caller.id) {
            return Err(ServiceError::permission_denied(
                "You are not allowed to edit this incident",
            ));
        }
        if self.storage.get_user(&dto.user_id).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }
        self.require_event(dto.event_id).await?;

        let incident = Incident::from(dto);
        self.storage.update_incident(&incident).await?;
        Ok(incident.into())
    }
}

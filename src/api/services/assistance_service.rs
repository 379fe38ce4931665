//! Event attendance.

use super::error::{ServiceError, ServiceResult, on_conflict};
use super::event_service::EventService;
use crate::models::{Assistance, EventDto, Page, PageRequest};
use crate::storage::StorageBackend;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AssistanceService {
    storage: Arc<dyn StorageBackend>,
    events: EventService,
}

impl AssistanceService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            events: EventService::new(storage.clone()),
            storage,
        }
    }

    pub async fn attend(&self, user_id: &str, event_id: i64) -> ServiceResult<Assistance> {
        self.events.require_event(event_id).await?;
        let assistance = Assistance {
            user_id: user_id.to_string(),
            event_id,
        };
        self.storage
            .insert_assistance(&assistance)
            .await
            .map_err(on_conflict("Assistance already exists"))?;
        info!("User {} attends event {}", user_id, event_id);
        Ok(assistance)
    }

    pub async fn is_attending(&self, user_id: &str, event_id: i64) -> ServiceResult<bool> {
        let assistance = Assistance {
            user_id: user_id.to_string(),
            event_id,
        };
        Ok(self.storage.assistance_exists(&assistance).await?)
    }

    pub async fn attended_events(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let ids = self.storage.attended_event_ids(user_id).await?;
        let events = self.storage.get_events(&ids).await?;
        let dtos = self.events.to_dtos(events).await?;
        Ok(Page::paginate(dtos, page))
    }

    pub async fn withdraw(&self, user_id: &str, event_id: i64) -> ServiceResult<bool> {
        let assistance = Assistance {
            user_id: user_id.to_string(),
            event_id,
        };
        if !self.storage.delete_assistance(&assistance).await? {
            return Err(ServiceError::not_found("Assistance not found"));
        }
        Ok(true)
    }
}

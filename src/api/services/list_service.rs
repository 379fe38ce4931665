//! User-curated event lists.

use super::error::{ServiceError, ServiceResult};
use super::event_service::EventService;
use crate::models::list::{DEFAULT_LIST_DESCRIPTION, FAVOURITES_LIST_NAME, LIST_PREVIEW_IMAGES};
use crate::models::{EventDto, EventList, ListDto, Page, PageRequest};
use crate::storage::{StorageBackend, StorageError};
use std::sync::Arc;
use tracing::info;

/// Service for event lists.
#[derive(Clone)]
pub struct ListService {
    storage: Arc<dyn StorageBackend>,
    events: EventService,
}

impl ListService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            events: EventService::new(storage.clone()),
            storage,
        }
    }

    /// Fetch a list, checking that `user_id` owns it.
    async fn owned_list(&self, list_id: i64, user_id: &str) -> ServiceResult<EventList> {
        let list = self
            .storage
            .get_list(list_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("List not found"))?;
        if list.user_id != user_id {
            return Err(ServiceError::permission_denied(
                "User is not the owner of the list",
            ));
        }
        Ok(list)
    }

    async fn to_dto(&self, list: EventList) -> ServiceResult<ListDto> {
        let events = self.storage.get_events(&list.events).await?;
        let first_images = events
            .iter()
            .flat_map(|e| e.details.image_urls())
            .take(LIST_PREVIEW_IMAGES)
            .map(str::to_string)
            .collect();
        Ok(ListDto::new(list, first_images))
    }

    pub async fn lists_of(
        &self,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<ListDto>> {
        let lists = self.storage.lists_by_user(user_id).await?;
        let mut dtos = Vec::with_capacity(lists.len());
        for list in lists {
            dtos.push(self.to_dto(list).await?);
        }
        Ok(Page::paginate(dtos, page))
    }

    pub async fn events_of(
        &self,
        list_id: i64,
        user_id: &str,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let list = self.owned_list(list_id, user_id).await?;
        let events = self.storage.get_events(&list.events).await?;
        let dtos = self.events.to_dtos(events).await?;
        Ok(Page::paginate(dtos, page))
    }

    pub async fn create(&self, user_id: &str, name: &str) -> ServiceResult<ListDto> {
        if name == FAVOURITES_LIST_NAME {
            return Err(ServiceError::permission_denied(format!(
                "The list name {} is reserved",
                FAVOURITES_LIST_NAME
            )));
        }
        let list = self
            .storage
            .insert_list(user_id, name, DEFAULT_LIST_DESCRIPTION)
            .await?;
        info!("User {} created list {}", user_id, list.id);
        Ok(ListDto::new(list, Vec::new()))
    }

    /// Rename or redescribe a list. Empty values leave a field unchanged.
    pub async fn edit(
        &self,
        list_id: i64,
        user_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> ServiceResult<ListDto> {
        let mut list = self.owned_list(list_id, user_id).await?;
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            list.name = name;
        }
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            list.description = description;
        }
        if list.name == FAVOURITES_LIST_NAME {
            return Err(ServiceError::permission_denied(format!(
                "The list name {} is reserved",
                FAVOURITES_LIST_NAME
            )));
        }
        self.storage.update_list(&list).await?;
        self.to_dto(list).await
    }

    pub async fn add_event(
        &self,
        list_id: i64,
        event_id: i64,
        user_id: &str,
    ) -> ServiceResult<ListDto> {
        let list = self.owned_list(list_id, user_id).await?;
        self.events.require_event(event_id).await?;
        if list.contains(event_id) {
            return Err(ServiceError::permission_denied(
                "The list already contains the event",
            ));
        }
        match self.storage.add_event_to_list(list_id, event_id).await {
            Ok(()) => {}
            Err(StorageError::AlreadyExists { .. }) => {
                return Err(ServiceError::permission_denied(
                    "The list already contains the event",
                ));
            }
            Err(e) => return Err(e.into()),
        }
        let list = self.owned_list(list_id, user_id).await?;
        self.to_dto(list).await
    }

    pub async fn remove_event(
        &self,
        list_id: i64,
        event_id: i64,
        user_id: &str,
    ) -> ServiceResult<bool> {
        self.owned_list(list_id, user_id).await?;
        if !self.storage.remove_event_from_list(list_id, event_id).await? {
            return Err(ServiceError::not_found("The list does not contain the event"));
        }
        Ok(true)
    }

    pub async fn delete(&self, list_id: i64, user_id: &str) -> ServiceResult<bool> {
        self.owned_list(list_id, user_id).await?;
        self.storage.delete_list(list_id).await?;
        info!("User {} deleted list {}", user_id, list_id);
        Ok(true)
    }
}

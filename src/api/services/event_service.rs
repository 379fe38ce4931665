//! Event catalogue operations: creation, search, ratings and tags.

use super::error::{ServiceError, ServiceResult, on_conflict};
use crate::models::{
    Event, EventDetails, EventDto, EventFilter, GeoArea, Page, PageRequest, TextMatch,
};
use crate::storage::StorageBackend;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

/// Optional criteria accepted by the combined event search.
#[derive(Debug, Clone, Default)]
pub struct EventSearch {
    pub scope: Option<String>,
    pub category: Option<String>,
    pub other_categories: Option<String>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub price: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    pub radius: Option<f32>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
}

fn contains(value: Option<String>) -> Option<TextMatch> {
    value.filter(|v| !v.is_empty()).map(TextMatch::Contains)
}

impl EventSearch {
    /// Build the storage filter. Without a lower date bound only upcoming
    /// events (starting today or later) are considered.
    pub fn into_filter(self, today: NaiveDate) -> EventFilter {
        let area = match (self.radius, self.latitude, self.longitude) {
            (Some(radius), Some(latitude), Some(longitude)) => Some(GeoArea {
                latitude,
                longitude,
                radius,
            }),
            _ => None,
        };
        EventFilter {
            name: contains(self.name),
            description: contains(self.description),
            scope: contains(self.scope),
            category: contains(self.category),
            other_categories: contains(self.other_categories),
            price: contains(self.price),
            region: contains(self.region),
            starts_on_or_after: Some(self.from.unwrap_or(today)),
            ends_on_or_before: self.until,
            area,
            ..Default::default()
        }
    }
}

/// Split comma-separated tag fields into a sorted set, ignoring blanks and `null`.
pub fn collect_tags<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    fields
        .into_iter()
        .flat_map(|field| field.split(','))
        .filter(|tag| !tag.is_empty() && *tag != "null")
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Service for the event catalogue.
#[derive(Clone)]
pub struct EventService {
    storage: Arc<dyn StorageBackend>,
}

impl EventService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Attach score and assistance count to each event.
    pub async fn to_dtos(&self, events: Vec<Event>) -> ServiceResult<Vec<EventDto>> {
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let stats = self.storage.event_stats(&ids).await?;
        Ok(events
            .into_iter()
            .map(|event| {
                let event_stats = stats.get(&event.id).copied().unwrap_or_default();
                EventDto::from_event(event, event_stats)
            })
            .collect())
    }

    async fn page_to_dtos(&self, page: Page<Event>) -> ServiceResult<Page<EventDto>> {
        let ids: Vec<i64> = page.content.iter().map(|e| e.id).collect();
        let stats = self.storage.event_stats(&ids).await?;
        Ok(page.map(|event| {
            let event_stats = stats.get(&event.id).copied().unwrap_or_default();
            EventDto::from_event(event, event_stats)
        }))
    }

    pub async fn require_event(&self, event_id: i64) -> ServiceResult<Event> {
        self.storage
            .get_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event not found"))
    }

    pub async fn create(&self, dto: EventDto) -> ServiceResult<EventDto> {
        dto.validate()?;
        if self.storage.event_occurrence_exists(&dto.details).await? {
            return Err(ServiceError::already_exists("Event already exists"));
        }
        let event = self.storage.insert_event(&dto.details).await?;
        info!("Created event {} ({})", event.id, event.details.name);
        Ok(EventDto::from_event(event, Default::default()))
    }

    /// Store an imported event unless the same occurrence is already known.
    /// Returns whether it was inserted.
    pub async fn import(&self, details: &EventDetails) -> ServiceResult<bool> {
        if self.storage.event_occurrence_exists(details).await? {
            return Ok(false);
        }
        self.storage.insert_event(details).await?;
        Ok(true)
    }

    pub async fn search(
        &self,
        filter: &EventFilter,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let events = self.storage.search_events(filter, page).await?;
        self.page_to_dtos(events).await
    }

    pub async fn list_all(&self, page: Option<PageRequest>) -> ServiceResult<Page<EventDto>> {
        self.search(&EventFilter::default(), page).await
    }

    pub async fn get(&self, event_id: i64) -> ServiceResult<EventDto> {
        let event = self.require_event(event_id).await?;
        let mut dtos = self.to_dtos(vec![event]).await?;
        dtos.pop()
            .ok_or_else(|| ServiceError::not_found("Event not found"))
    }

    /// Events whose tags mention any of the user's preferred categories, in
    /// category order and without repeats.
    pub async fn suggestions(
        &self,
        categories: &[String],
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let mut seen = HashSet::new();
        let mut suggested = Vec::new();
        for category in categories {
            let filter = EventFilter {
                any_tag: Some(category.clone()),
                ..Default::default()
            };
            let matches = self.storage.search_events(&filter, None).await?;
            suggested.extend(matches.content.into_iter().filter(|e| seen.insert(e.id)));
        }
        debug!(
            "Suggesting {} events for {} categories",
            suggested.len(),
            categories.len()
        );
        let dtos = self.to_dtos(suggested).await?;
        Ok(Page::paginate(dtos, page))
    }

    /// Attended events, most attended first.
    pub async fn popular(&self, page: Option<PageRequest>) -> ServiceResult<Page<EventDto>> {
        let ids = self.storage.popular_event_ids().await?;
        let events = self.storage.get_events(&ids).await?;
        let dtos = self.to_dtos(events).await?;
        Ok(Page::paginate(dtos, page))
    }

    pub async fn delete(&self, event_id: i64) -> ServiceResult<bool> {
        if !self.storage.delete_event(event_id).await? {
            return Err(ServiceError::not_found("Event not found"));
        }
        info!("Deleted event {}", event_id);
        Ok(true)
    }

    pub async fn between_dates(
        &self,
        from: NaiveDate,
        until: NaiveDate,
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let filter = EventFilter {
            starts_on_or_after: Some(from),
            ends_on_or_before: Some(until),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    /// Upcoming events matching a single text criterion.
    pub async fn upcoming_matching(
        &self,
        today: NaiveDate,
        set: impl FnOnce(&mut EventFilter),
        page: Option<PageRequest>,
    ) -> ServiceResult<Page<EventDto>> {
        let mut filter = EventFilter {
            starts_on_or_after: Some(today),
            ..Default::default()
        };
        set(&mut filter);
        self.search(&filter, page).await
    }

    pub async fn tags(&self) -> ServiceResult<Vec<String>> {
        let fields = self.storage.list_tag_fields().await?;
        Ok(collect_tags(fields.iter().map(String::as_str)))
    }

    /// Replace the descriptive fields of an event, located by id or else by
    /// its exact description.
    pub async fn edit(&self, dto: EventDto) -> ServiceResult<EventDto> {
        let target = match dto.id {
            Some(id) => self.storage.get_event(id).await?,
            None => {
                let filter = EventFilter {
                    description: Some(TextMatch::Exact(dto.details.description.clone())),
                    ..Default::default()
                };
                let page = PageRequest { page: 0, size: 1 };
                self.storage
                    .search_events(&filter, Some(page))
                    .await?
                    .content
                    .into_iter()
                    .next()
            }
        }
        .ok_or_else(|| ServiceError::not_found("Event not found"))?;

        let updated = self
            .storage
            .update_event(target.id, &dto.details)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event not found"))?;
        info!("Edited event {}", updated.id);
        let mut dtos = self.to_dtos(vec![updated]).await?;
        dtos.pop()
            .ok_or_else(|| ServiceError::not_found("Event not found"))
    }

    pub async fn rate(&self, event_id: i64, user_id: &str, score: f32) -> ServiceResult<EventDto> {
        self.require_event(event_id).await?;
        self.storage
            .insert_rating(event_id, user_id, score)
            .await
            .map_err(on_conflict("Event already rated"))?;
        self.get(event_id).await
    }

    pub async fn unrate(&self, event_id: i64, user_id: &str) -> ServiceResult<bool> {
        self.require_event(event_id).await?;
        if !self.storage.delete_rating(event_id, user_id).await? {
            return Err(ServiceError::not_found("Rating not found"));
        }
        Ok(true)
    }

    pub async fn rating(&self, event_id: i64, user_id: &str) -> ServiceResult<Option<f32>> {
        Ok(self.storage.get_rating(event_id, user_id).await?)
    }
}

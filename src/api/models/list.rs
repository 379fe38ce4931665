use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name of the list every user gets on registration.
pub const FAVOURITES_LIST_NAME: &str = "Favorits";
pub const FAVOURITES_LIST_DESCRIPTION: &str = "Llista dels esdeveniments que més m'interessen!";
pub const DEFAULT_LIST_DESCRIPTION: &str = "Llista dels esdeveniments que m'interessen!";

/// How many preview images a list carries.
pub const LIST_PREVIEW_IMAGES: usize = 4;

/// A user-owned, ordered set of events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventList {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub events: Vec<i64>,
}

impl EventList {
    pub fn contains(&self, event_id: i64) -> bool {
        self.events.contains(&event_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDto {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub events: Vec<i64>,
    pub n_events: usize,
    pub first_images: Vec<String>,
}

impl ListDto {
    pub fn new(list: EventList, first_images: Vec<String>) -> Self {
        Self {
            id: list.id,
            user_id: list.user_id,
            name: list.name,
            description: list.description,
            n_events: list.events.len(),
            events: list.events,
            first_images,
        }
    }
}

use super::{empty_if_null, not_blank};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Descriptive fields of a cultural event.
///
/// Wire names follow the agenda feed vocabulary used by the mobile client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, Validate, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(rename = "dataInici")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFi")]
    pub end_date: NaiveDate,
    #[serde(rename = "denominacio", default, deserialize_with = "empty_if_null")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(rename = "descripcio", default, deserialize_with = "empty_if_null")]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(rename = "ambit", default, deserialize_with = "empty_if_null")]
    #[validate(custom(function = "not_blank"))]
    pub scope: String,
    #[serde(rename = "preu", default, deserialize_with = "empty_if_null")]
    pub price: String,
    #[serde(rename = "horari", default, deserialize_with = "empty_if_null")]
    pub schedule: String,
    #[serde(rename = "subtitol", default, deserialize_with = "empty_if_null")]
    pub subtitle: String,
    #[serde(rename = "categoria", default, deserialize_with = "empty_if_null")]
    pub category: String,
    #[serde(rename = "altresCategories", default, deserialize_with = "empty_if_null")]
    pub other_categories: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub link: String,
    #[serde(rename = "imatges", default, deserialize_with = "empty_if_null")]
    pub images: String,
    #[serde(rename = "adreca", default, deserialize_with = "empty_if_null")]
    pub address: String,
    #[serde(rename = "comarcaIMunicipi", default, deserialize_with = "empty_if_null")]
    pub region: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub email: String,
    #[serde(rename = "espai", default, deserialize_with = "empty_if_null")]
    pub venue: String,
    #[serde(rename = "latitud", default)]
    pub latitude: f32,
    #[serde(rename = "longitud", default)]
    pub longitude: f32,
    #[serde(rename = "telefon", default, deserialize_with = "empty_if_null")]
    pub phone: String,
    #[serde(rename = "imgApp", default, deserialize_with = "empty_if_null")]
    pub app_image: String,
}

impl EventDetails {
    /// The three tag-bearing fields: scope, category and other categories.
    pub fn tag_fields(&self) -> [&str; 3] {
        [&self.scope, &self.category, &self.other_categories]
    }

    /// Image URLs listed in `imatges`, skipping empty entries.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.images
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Whether two events describe the same occurrence.
    pub fn same_occurrence(&self, other: &EventDetails) -> bool {
        self.start_date == other.start_date
            && self.end_date == other.end_date
            && self.name == other.name
            && self.description == other.description
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    #[sqlx(flatten)]
    pub details: EventDetails,
}

/// Aggregates derived from ratings and assistances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventStats {
    /// Mean rating, 0 when unrated
    pub score: f32,
    /// Number of users attending
    pub assistants: i64,
}

/// Event as exchanged with clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    #[validate(nested)]
    pub details: EventDetails,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub number_of_assistants: i64,
}

impl EventDto {
    pub fn from_event(event: Event, stats: EventStats) -> Self {
        Self {
            id: Some(event.id),
            details: event.details,
            score: stats.score,
            number_of_assistants: stats.assistants,
        }
    }
}

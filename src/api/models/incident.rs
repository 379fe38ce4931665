use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A problem report filed by a user about an event.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Incident {
    pub id: i64,
    pub user_id: String,
    pub event_id: i64,
    pub description: Option<String>,
    pub response: Option<String>,
    pub is_resolved: bool,
}

/// Incident to be inserted; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub user_id: String,
    pub event_id: i64,
    pub description: Option<String>,
    pub response: Option<String>,
    pub is_resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub id: i64,
    pub user_id: String,
    pub event_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
}

impl From<Incident> for IncidentDto {
    fn from(incident: Incident) -> Self {
        Self {
            id: incident.id,
            user_id: incident.user_id,
            event_id: incident.event_id,
            description: incident.description,
            response: incident.response,
            is_resolved: incident.is_resolved,
        }
    }
}

impl From<IncidentDto> for Incident {
    fn from(dto: IncidentDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            event_id: dto.event_id,
            description: dto.description,
            response: dto.response,
            is_resolved: dto.is_resolved,
        }
    }
}

/// Payload for reporting a new incident. The reporter comes from the token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIncidentDto {
    pub event_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub is_resolved: Option<bool>,
}

impl SubmitIncidentDto {
    pub fn into_new_incident(self, user_id: String) -> NewIncident {
        NewIncident {
            user_id,
            event_id: self.event_id,
            description: self.description,
            response: self.response,
            is_resolved: self.is_resolved.unwrap_or(false),
        }
    }
}

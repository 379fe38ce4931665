// Models module - contains events, users, lists, incidents, assistances and paging

pub mod assistance;
pub mod event;
pub mod filter;
pub mod incident;
pub mod list;
pub mod page;
pub mod user;

pub use assistance::Assistance;
pub use event::{Event, EventDetails, EventDto, EventStats};
pub use filter::{EventFilter, GeoArea, IncidentFilter, TextMatch};
pub use incident::{Incident, IncidentDto, NewIncident, SubmitIncidentDto};
pub use list::{EventList, ListDto};
pub use page::{EventPage, IncidentPage, ListPage, Page, PageRequest, PaginationParams, UserPage};
pub use user::{RegisteredUserDto, Session, User, UserAuthenticationDto, UserDto};

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Deserialize a nullable JSON string, mapping `null` to an empty string.
pub fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validator rejecting empty or whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

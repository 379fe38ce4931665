//! Search criteria for events and incidents.

use super::{EventDetails, Incident};
use chrono::NaiveDate;

/// How a text criterion compares against a field.
#[derive(Debug, Clone, PartialEq)]
pub enum TextMatch {
    Contains(String),
    Exact(String),
}

impl TextMatch {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::Contains(needle) => value.contains(needle.as_str()),
            TextMatch::Exact(expected) => value == expected,
        }
    }
}

/// Squared-degree neighbourhood around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoArea {
    pub latitude: f32,
    pub longitude: f32,
    /// Compared against the squared coordinate distance
    pub radius: f32,
}

impl GeoArea {
    pub fn contains(&self, latitude: f32, longitude: f32) -> bool {
        let d_lat = latitude - self.latitude;
        let d_lon = longitude - self.longitude;
        d_lat * d_lat + d_lon * d_lon <= self.radius
    }
}

/// Conjunction of optional event criteria. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub name: Option<TextMatch>,
    pub description: Option<TextMatch>,
    pub scope: Option<TextMatch>,
    pub category: Option<TextMatch>,
    pub other_categories: Option<TextMatch>,
    pub price: Option<TextMatch>,
    pub region: Option<TextMatch>,
    /// Matches when any tag field contains the value
    pub any_tag: Option<String>,
    /// Inclusive lower bound on the start date
    pub starts_on_or_after: Option<NaiveDate>,
    /// Inclusive upper bound on the end date
    pub ends_on_or_before: Option<NaiveDate>,
    /// Exact start date
    pub starts_on: Option<NaiveDate>,
    pub area: Option<GeoArea>,
}

impl EventFilter {
    pub fn matches(&self, event: &EventDetails) -> bool {
        let text_criteria = [
            (&self.name, &event.name),
            (&self.description, &event.description),
            (&self.scope, &event.scope),
            (&self.category, &event.category),
            (&self.other_categories, &event.other_categories),
            (&self.price, &event.price),
            (&self.region, &event.region),
        ];
        if text_criteria
            .iter()
            .any(|(criterion, value)| criterion.as_ref().is_some_and(|c| !c.matches(value)))
        {
            return false;
        }

        if let Some(tag) = &self.any_tag
            && !event.tag_fields().iter().any(|field| field.contains(tag.as_str()))
        {
            return false;
        }
        if self.starts_on_or_after.is_some_and(|from| event.start_date < from) {
            return false;
        }
        if self.ends_on_or_before.is_some_and(|until| event.end_date > until) {
            return false;
        }
        if self.starts_on.is_some_and(|day| event.start_date != day) {
            return false;
        }
        if let Some(area) = &self.area
            && !area.contains(event.latitude, event.longitude)
        {
            return false;
        }
        true
    }
}

/// Optional incident criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentFilter {
    pub user_id: Option<String>,
    pub event_id: Option<i64>,
    pub resolved: Option<bool>,
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        self.user_id.as_ref().is_none_or(|u| &incident.user_id == u)
            && self.event_id.is_none_or(|e| incident.event_id == e)
            && self.resolved.is_none_or(|r| incident.is_resolved == r)
    }
}

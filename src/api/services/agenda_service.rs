//! Client for the public "Agenda cultural" open-data feed.
//!
//! Feed records use their own field names and carry HTML descriptions,
//! prefixed tags (`agenda:ambits/musica`) and timestamps. They are
//! normalised into [`EventDetails`] before import.

use crate::models::EventDetails;
use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Stored when the feed gives no usable date (9999-09-09).
pub fn unknown_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 9, 9).unwrap_or(NaiveDate::MAX)
}

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</?(p|div|li|ul|ol|h[1-6]|tr|td|th|table|blockquote)\b[^>]*>")
        .expect("valid block tag pattern")
});
static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
        .expect("valid script pattern")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

#[derive(Debug, Error)]
pub enum AgendaError {
    #[error("Agenda request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Agenda returned status {0}")]
    Status(u16),
    #[error("Agenda response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Accept strings, numbers and `null` for a feed value.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One record as published by the feed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedEvent {
    #[serde(deserialize_with = "lenient_string")]
    pub data_inici: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub data_fi: Option<String>,
    #[serde(rename = "denominaci", deserialize_with = "lenient_string")]
    pub denominacio: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub descripcio: Option<String>,
    #[serde(rename = "entrades", deserialize_with = "lenient_string")]
    pub preu: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub horari: Option<String>,
    #[serde(rename = "subt_tol", deserialize_with = "lenient_string")]
    pub subtitol: Option<String>,
    #[serde(rename = "tags_mbits", deserialize_with = "lenient_string")]
    pub ambit: Option<String>,
    #[serde(rename = "tags_categor_es", deserialize_with = "lenient_string")]
    pub categoria: Option<String>,
    #[serde(rename = "tags_altres_categor_es", deserialize_with = "lenient_string")]
    pub altres_categories: Option<String>,
    #[serde(rename = "enlla_os", deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub imatges: Option<String>,
    #[serde(rename = "adre_a", deserialize_with = "lenient_string")]
    pub adreca: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub comarca_i_municipi: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub espai: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub latitud: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub longitud: Option<String>,
    #[serde(rename = "tel_fon", deserialize_with = "lenient_string")]
    pub telefon: Option<String>,
    #[serde(rename = "imgapp", deserialize_with = "lenient_string")]
    pub img_app: Option<String>,
}

/// Missing values and the literal `null` become empty text.
fn text(value: Option<String>) -> String {
    value.filter(|v| v != "null").unwrap_or_default()
}

/// Reduce an HTML fragment to its visible text.
pub fn strip_html(html: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(html, "");
    let spaced = BLOCK_TAG.replace_all(&without_scripts, " ");
    let bare = ANY_TAG.replace_all(&spaced, "");
    let decoded = html_escape::decode_html_entities(&bare).replace('·', "");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Date part of a feed timestamp (`2024-05-01T00:00:00.000`).
pub fn parse_feed_date(value: &str) -> NaiveDate {
    let date_part = value.split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").unwrap_or_else(|_| unknown_date())
}

/// Drop the namespace of each comma-separated tag (`agenda:ambits/musica` -> `musica`).
pub fn strip_tag_prefixes(tags: &str) -> String {
    tags.split(',')
        .map(|tag| tag.split_once('/').map_or(tag, |(_, rest)| rest))
        .collect::<Vec<_>>()
        .join(",")
}

/// Turn an `agenda:ubicacions/...` path into a readable place.
pub fn normalize_region(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = value.split('/').collect();
    match parts.len() {
        1 => value.to_string(),
        2 | 3 => parts[1].to_string(),
        _ => format!("{},{}", parts[3], parts[1]),
    }
}

fn parse_coordinate(value: &str) -> f32 {
    value.trim().parse().unwrap_or(0.0)
}

impl FeedEvent {
    pub fn into_details(self) -> EventDetails {
        EventDetails {
            start_date: parse_feed_date(&text(self.data_inici)),
            end_date: parse_feed_date(&text(self.data_fi)),
            name: text(self.denominacio),
            description: strip_html(&text(self.descripcio)),
            scope: strip_tag_prefixes(&text(self.ambit)),
            price: text(self.preu),
            schedule: text(self.horari),
            subtitle: text(self.subtitol),
            category: strip_tag_prefixes(&text(self.categoria)),
            other_categories: strip_tag_prefixes(&text(self.altres_categories)),
            link: text(self.link),
            images: text(self.imatges),
            address: text(self.adreca),
            region: normalize_region(&text(self.comarca_i_municipi)),
            email: text(self.email),
            venue: text(self.espai),
            latitude: parse_coordinate(&text(self.latitud)),
            longitude: parse_coordinate(&text(self.longitud)),
            phone: text(self.telefon),
            app_image: text(self.img_app),
        }
    }
}

/// Parse a feed response body into normalised events.
pub fn parse_feed(body: &str) -> Result<Vec<EventDetails>, serde_json::Error> {
    let records: Vec<FeedEvent> = serde_json::from_str(body)?;
    Ok(records.into_iter().map(FeedEvent::into_details).collect())
}

/// HTTP client for the agenda feed.
#[derive(Clone)]
pub struct AgendaClient {
    http: reqwest::Client,
    url: String,
    app_token: Option<String>,
}

impl AgendaClient {
    pub fn new(url: impl Into<String>, app_token: Option<String>) -> Result<Self, AgendaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("culture-finder-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            app_token,
        })
    }

    /// Fetch events starting after the current local time.
    pub async fn fetch_upcoming(&self) -> Result<Vec<EventDetails>, AgendaError> {
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        let condition = format!("data_inici > '{}'", now);
        debug!("Fetching agenda events where {}", condition);

        let mut request = self.http.get(&self.url).query(&[("$where", condition)]);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AgendaError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let events = parse_feed(&body)?;
        info!("Fetched {} events from the agenda feed", events.len());
        Ok(events)
    }
}

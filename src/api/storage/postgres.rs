//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the StorageBackend trait.

use super::{StorageError, traits::StorageBackend};
use crate::models::{
    Assistance, Event, EventDetails, EventFilter, EventList, EventStats, Incident,
    IncidentFilter, NewIncident, Page, PageRequest, Session, TextMatch, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

const USER_COLUMNS: &str = "id, name, birth_date, profile_image, preferred_categories, is_admin";

const EVENT_COLUMNS: &str = "id, start_date, end_date, name, description, scope, price, schedule, \
     subtitle, category, other_categories, link, images, address, region, email, venue, \
     latitude, longitude, phone, app_image";

const INCIDENT_COLUMNS: &str = "id, user_id, event_id, description, response, is_resolved";

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::ConnectionError(e.to_string())
}

/// Escape LIKE metacharacters and wrap the needle for substring matching.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_text_match(builder: &mut QueryBuilder<'_, Postgres>, column: &str, criterion: &Option<TextMatch>) {
    match criterion {
        Some(TextMatch::Contains(needle)) => {
            builder.push(format!(" AND {} LIKE ", column));
            builder.push_bind(like_pattern(needle));
        }
        Some(TextMatch::Exact(value)) => {
            builder.push(format!(" AND {} = ", column));
            builder.push_bind(value.clone());
        }
        None => {}
    }
}

fn push_event_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    push_text_match(builder, "name", &filter.name);
    push_text_match(builder, "description", &filter.description);
    push_text_match(builder, "scope", &filter.scope);
    push_text_match(builder, "category", &filter.category);
    push_text_match(builder, "other_categories", &filter.other_categories);
    push_text_match(builder, "price", &filter.price);
    push_text_match(builder, "region", &filter.region);

    if let Some(tag) = &filter.any_tag {
        let pattern = like_pattern(tag);
        builder.push(" AND (other_categories LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR scope LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR category LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(from) = filter.starts_on_or_after {
        builder.push(" AND start_date >= ");
        builder.push_bind(from);
    }
    if let Some(until) = filter.ends_on_or_before {
        builder.push(" AND end_date <= ");
        builder.push_bind(until);
    }
    if let Some(day) = filter.starts_on {
        builder.push(" AND start_date = ");
        builder.push_bind(day);
    }
    if let Some(area) = filter.area {
        builder.push(" AND (latitude - ");
        builder.push_bind(area.latitude);
        builder.push(") * (latitude - ");
        builder.push_bind(area.latitude);
        builder.push(") + (longitude - ");
        builder.push_bind(area.longitude);
        builder.push(") * (longitude - ");
        builder.push_bind(area.longitude);
        builder.push(") <= ");
        builder.push_bind(area.radius);
    }
}

fn push_incident_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &IncidentFilter) {
    if let Some(user_id) = &filter.user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id.clone());
    }
    if let Some(event_id) = filter.event_id {
        builder.push(" AND event_id = ");
        builder.push_bind(event_id);
    }
    if let Some(resolved) = filter.resolved {
        builder.push(" AND is_resolved = ");
        builder.push_bind(resolved);
    }
}

#[derive(sqlx::FromRow)]
struct ListRow {
    id: i64,
    user_id: String,
    name: String,
    description: String,
}

/// PostgreSQL storage backend implementation.
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach ordered event ids to list rows.
    async fn with_events(&self, rows: Vec<ListRow>) -> Result<Vec<EventList>, StorageError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let entries: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT list_id, event_id FROM list_events WHERE list_id = ANY($1) ORDER BY seq",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut events: HashMap<i64, Vec<i64>> = HashMap::new();
        for (list_id, event_id) in entries {
            events.entry(list_id).or_default().push(event_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| EventList {
                events: events.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                name: row.name,
                description: row.description,
            })
            .collect())
    }
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, birth_date, profile_image, preferred_categories, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.birth_date)
        .bind(&user.profile_image)
        .bind(&user.preferred_categories)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::already_exists("user", &user.id));
        }
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, birth_date = $3, profile_image = $4, preferred_categories = $5, is_admin = $6
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.birth_date)
        .bind(&user.profile_image)
        .bind(&user.preferred_categories)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("user", &user.id));
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_session_by_user(&self, user_id: &str) -> Result<Option<Session>, StorageError> {
        sqlx::query_as::<_, Session>(
            "SELECT user_id, token, device_token FROM sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, StorageError> {
        sqlx::query_as::<_, Session>(
            "SELECT user_id, token, device_token FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (user_id, token, device_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&session.user_id)
        .bind(&session.token)
        .bind(&session.device_token)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::already_exists("session", &session.user_id));
        }
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        sqlx::query_as::<_, Session>(
            "SELECT user_id, token, device_token FROM sessions ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert_event(&self, details: &EventDetails) -> Result<Event, StorageError> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (start_date, end_date, name, description, scope, price, schedule,
                subtitle, category, other_categories, link, images, address, region, email, venue,
                latitude, longitude, phone, app_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.scope)
        .bind(&details.price)
        .bind(&details.schedule)
        .bind(&details.subtitle)
        .bind(&details.category)
        .bind(&details.other_categories)
        .bind(&details.link)
        .bind(&details.images)
        .bind(&details.address)
        .bind(&details.region)
        .bind(&details.email)
        .bind(&details.venue)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(&details.phone)
        .bind(&details.app_image)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn update_event(
        &self,
        event_id: i64,
        details: &EventDetails,
    ) -> Result<Option<Event>, StorageError> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET start_date = $2, end_date = $3, name = $4, description = $5, scope = $6, price = $7,
                schedule = $8, subtitle = $9, category = $10, other_categories = $11, link = $12,
                images = $13, address = $14, region = $15, email = $16, venue = $17,
                latitude = $18, longitude = $19, phone = $20, app_image = $21
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.scope)
        .bind(&details.price)
        .bind(&details.schedule)
        .bind(&details.subtitle)
        .bind(&details.category)
        .bind(&details.other_categories)
        .bind(&details.link)
        .bind(&details.images)
        .bind(&details.address)
        .bind(&details.region)
        .bind(&details.email)
        .bind(&details.venue)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(&details.phone)
        .bind(&details.app_image)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>, StorageError> {
        sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn get_events(&self, event_ids: &[i64]) -> Result<Vec<Event>, StorageError> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = ANY($1)",
            EVENT_COLUMNS
        ))
        .bind(event_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut by_id: HashMap<i64, Event> = rows.into_iter().map(|e| (e.id, e)).collect();
        Ok(event_ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn event_occurrence_exists(&self, details: &EventDetails) -> Result<bool, StorageError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events
                WHERE start_date = $1 AND end_date = $2 AND name = $3 AND description = $4
            )
            "#,
        )
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(&details.name)
        .bind(&details.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn search_events(
        &self,
        filter: &EventFilter,
        page: Option<PageRequest>,
    ) -> Result<Page<Event>, StorageError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events WHERE TRUE");
        push_event_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM events WHERE TRUE",
            EVENT_COLUMNS
        ));
        push_event_filter(&mut select, filter);
        select.push(" ORDER BY id");
        if let Some(request) = page {
            select.push(" LIMIT ");
            select.push_bind(i64::try_from(request.size).unwrap_or(i64::MAX));
            select.push(" OFFSET ");
            select.push_bind(i64::try_from(request.offset()).unwrap_or(i64::MAX));
        }
        let events = select
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Page::new(events, total.max(0) as usize, page))
    }

    async fn list_tag_fields(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT DISTINCT scope, category, other_categories FROM events")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(rows
            .into_iter()
            .flat_map(|(scope, category, other)| [scope, category, other])
            .collect())
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool, StorageError> {
        // Ratings, assistances, incidents and list entries cascade.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn event_stats(
        &self,
        event_ids: &[i64],
    ) -> Result<HashMap<i64, EventStats>, StorageError> {
        let rows: Vec<(i64, f32, i64)> = sqlx::query_as(
            r#"
            SELECT e.id,
                   COALESCE((SELECT AVG(r.score) FROM event_ratings r WHERE r.event_id = e.id), 0)::REAL,
                   (SELECT COUNT(*) FROM assistances a WHERE a.event_id = e.id)
            FROM UNNEST($1::BIGINT[]) AS e(id)
            "#,
        )
        .bind(event_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, score, assistants)| (id, EventStats { score, assistants }))
            .collect())
    }

    async fn get_rating(&self, event_id: i64, user_id: &str) -> Result<Option<f32>, StorageError> {
        sqlx::query_scalar::<_, f32>(
            "SELECT score FROM event_ratings WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert_rating(
        &self,
        event_id: i64,
        user_id: &str,
        score: f32,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO event_ratings (event_id, user_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::already_exists(
                "rating",
                format!("{}/{}", event_id, user_id),
            ));
        }
        Ok(())
    }

    async fn delete_rating(&self, event_id: i64, user_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM event_ratings WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_ratings_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM event_ratings WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn insert_assistance(&self, assistance: &Assistance) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO assistances (user_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, event_id) DO NOTHING
            "#,
        )
        .bind(&assistance.user_id)
        .bind(assistance.event_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::already_exists(
                "assistance",
                format!("{}/{}", assistance.user_id, assistance.event_id),
            ));
        }
        Ok(())
    }

    async fn assistance_exists(&self, assistance: &Assistance) -> Result<bool, StorageError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM assistances WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(&assistance.user_id)
        .bind(assistance.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn delete_assistance(&self, assistance: &Assistance) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM assistances WHERE user_id = $1 AND event_id = $2")
            .bind(&assistance.user_id)
            .bind(assistance.event_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_assistances_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM assistances WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn attended_event_ids(&self, user_id: &str) -> Result<Vec<i64>, StorageError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT event_id FROM assistances WHERE user_id = $1 ORDER BY event_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn popular_event_ids(&self) -> Result<Vec<i64>, StorageError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT event_id FROM assistances GROUP BY event_id ORDER BY COUNT(*) DESC, event_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn attendees_of_events_starting(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, StorageError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT a.user_id
            FROM assistances a
            JOIN events e ON e.id = a.event_id
            WHERE e.start_date = $1
            ORDER BY a.user_id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert_list(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<EventList, StorageError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO lists (user_id, name, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(EventList {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            events: Vec::new(),
        })
    }

    async fn get_list(&self, list_id: i64) -> Result<Option<EventList>, StorageError> {
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT id, user_id, name, description FROM lists WHERE id = $1",
        )
        .bind(list_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(self.with_events(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn lists_by_user(&self, user_id: &str) -> Result<Vec<EventList>, StorageError> {
        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT id, user_id, name, description FROM lists WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        self.with_events(rows).await
    }

    async fn update_list(&self, list: &EventList) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE lists SET name = $2, description = $3 WHERE id = $1")
            .bind(list.id)
            .bind(&list.name)
            .bind(&list.description)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("list", list.id));
        }
        Ok(())
    }

    async fn add_event_to_list(&self, list_id: i64, event_id: i64) -> Result<(), StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM lists WHERE id = $1)")
            .bind(list_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        if !exists {
            return Err(StorageError::not_found("list", list_id));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO list_events (list_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT (list_id, event_id) DO NOTHING
            "#,
        )
        .bind(list_id)
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::already_exists(
                "list event",
                format!("{}/{}", list_id, event_id),
            ));
        }
        Ok(())
    }

    async fn remove_event_from_list(
        &self,
        list_id: i64,
        event_id: i64,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM list_events WHERE list_id = $1 AND event_id = $2")
            .bind(list_id)
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_list(&self, list_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_lists_by_user(&self, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM lists WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn insert_incident(&self, incident: &NewIncident) -> Result<Incident, StorageError> {
        sqlx::query_as::<_, Incident>(&format!(
            r#"
            INSERT INTO incidents (user_id, event_id, description, response, is_resolved)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        ))
        .bind(&incident.user_id)
        .bind(incident.event_id)
        .bind(&incident.description)
        .bind(&incident.response)
        .bind(incident.is_resolved)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_incident(&self, incident_id: i64) -> Result<Option<Incident>, StorageError> {
        sqlx::query_as::<_, Incident>(&format!(
            "SELECT {} FROM incidents WHERE id = $1",
            INCIDENT_COLUMNS
        ))
        .bind(incident_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn update_incident(&self, incident: &Incident) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE incidents
            SET user_id = $2, event_id = $3, description = $4, response = $5, is_resolved = $6
            WHERE id = $1
            "#,
        )
        .bind(incident.id)
        .bind(&incident.user_id)
        .bind(incident.event_id)
        .bind(&incident.description)
        .bind(&incident.response)
        .bind(incident.is_resolved)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("incident", incident.id));
        }
        Ok(())
    }

    async fn delete_incident(&self, incident_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(incident_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_incidents(
        &self,
        filter: &IncidentFilter,
    ) -> Result<Vec<Incident>, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM incidents WHERE TRUE",
            INCIDENT_COLUMNS
        ));
        push_incident_filter(&mut builder, filter);
        builder.push(" ORDER BY id");
        builder
            .build_query_as::<Incident>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn delete_incidents(&self, filter: &IncidentFilter) -> Result<u64, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM incidents WHERE TRUE");
        push_incident_filter(&mut builder, filter);
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}

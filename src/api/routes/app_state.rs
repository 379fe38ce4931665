//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state:
//! configuration, the storage backend, the token signer and the push
//! notification sender. Domain services are cheap views built on demand.

use crate::api::config::AppConfig;
use crate::services::agenda_service::{AgendaClient, AgendaError};
use crate::services::{
    AssistanceService, EventService, FcmNotifier, IncidentService, JwtService, ListService,
    LogNotifier, NotificationService, PushNotifier, RefreshService, SharedJwtService, UserService,
};
use crate::storage::{MemoryStorageBackend, PostgresStorageBackend, StorageBackend, StorageError};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Storage backend (PostgreSQL or in-memory)
    pub storage: Arc<dyn StorageBackend>,
    pub jwt: SharedJwtService,
    pub notifier: Arc<dyn PushNotifier>,
    /// PostgreSQL database connection pool (optional)
    pub database: Option<PgPool>,
}

impl AppState {
    /// Create a state with default configuration, in-memory storage and
    /// log-only notifications.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(&config.jwt_secret)),
            config: Arc::new(config),
            storage: Arc::new(MemoryStorageBackend::new()),
            notifier: Arc::new(LogNotifier),
            database: None,
        }
    }

    /// Replace the notification sender.
    pub fn with_notifier(mut self, notifier: Arc<dyn PushNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the storage backend.
    pub fn with_storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = storage;
        self
    }

    /// Connect to PostgreSQL when a database URL is configured.
    ///
    /// Migrations are applied on connect. Without a URL the in-memory
    /// backend is kept.
    pub async fn init_storage(&mut self) -> Result<(), StorageError> {
        let Some(database_url) = self.config.database_url.clone() else {
            warn!("DATABASE_URL not set, using in-memory storage");
            return Ok(());
        };

        let pool = sqlx::PgPool::connect(&database_url).await.map_err(|e| {
            StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
        })?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

        self.storage = Arc::new(PostgresStorageBackend::new(pool.clone()));
        self.database = Some(pool);
        info!("Connected to PostgreSQL");
        Ok(())
    }

    /// Use Firebase Cloud Messaging when a project is configured.
    pub fn init_notifier(&mut self) {
        let Some(project_id) = self.config.firebase_project_id.as_deref() else {
            info!("FIREBASE_PROJECT_ID not set, push notifications are only logged");
            return;
        };
        match FcmNotifier::from_env(project_id) {
            Ok(notifier) => {
                self.notifier = Arc::new(notifier);
                info!("Push notifications enabled for project {}", project_id);
            }
            Err(e) => warn!("Push notifications disabled: {}", e),
        }
    }

    /// Get a reference to the database pool if available.
    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    /// Check if PostgreSQL storage is enabled
    pub fn is_postgres(&self) -> bool {
        self.database.is_some()
    }

    pub fn events(&self) -> EventService {
        EventService::new(self.storage.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.storage.clone(), self.jwt.clone())
    }

    pub fn lists(&self) -> ListService {
        ListService::new(self.storage.clone())
    }

    pub fn assistances(&self) -> AssistanceService {
        AssistanceService::new(self.storage.clone())
    }

    pub fn incidents(&self) -> IncidentService {
        IncidentService::new(self.storage.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.storage.clone(), self.notifier.clone())
    }

    pub fn refresh(&self) -> Result<RefreshService, AgendaError> {
        let agenda = AgendaClient::new(
            self.config.agenda_url.clone(),
            self.config.agenda_app_token.clone(),
        )?;
        Ok(RefreshService::new(
            agenda,
            self.events(),
            self.notifications(),
        ))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

//! Push notifications to the mobile app.
//!
//! Delivery goes through a [`PushNotifier`]. In production that is Firebase
//! Cloud Messaging; without a Firebase project notifications are only
//! logged.

use super::error::{ServiceError, ServiceResult};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// OAuth scope required by the FCM v1 send endpoint.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

pub const NEAR_EVENTS_TITLE: &str = "Esdeveniments propers";
pub const NEAR_EVENTS_BODY: &str =
    "Algun esdeveniment al que assisteixes s'aproxima! Comprova-ho a la app!";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Push service rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a notification to a single device.
#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Firebase Cloud Messaging HTTP v1 sender.
pub struct FcmNotifier {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    send_url: String,
}

impl FcmNotifier {
    /// Build a sender using the service account in `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_env(project_id: &str) -> Result<Self, NotifyError> {
        let service_account = CustomServiceAccount::from_env()
            .map_err(|e| NotifyError::Auth(format!("Failed to load service account: {}", e)))?
            .ok_or_else(|| {
                NotifyError::Auth("GOOGLE_APPLICATION_CREDENTIALS not set".to_string())
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("culture-finder-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            auth: Arc::new(service_account),
            send_url: format!(
                "https://fcm.googleapis.com/v1/projects/{}/messages:send",
                project_id
            ),
        })
    }
}

#[async_trait]
impl PushNotifier for FcmNotifier {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        let token = self
            .auth
            .token(&[FCM_SCOPE])
            .await
            .map_err(|e| NotifyError::Auth(e.to_string()))?;

        let message = json!({
            "message": {
                "token": device_token,
                "notification": { "title": title, "body": body }
            }
        });

        let response = self
            .http
            .post(&self.send_url)
            .bearer_auth(token.as_str())
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!("Push notification delivered");
        Ok(())
    }
}

/// Sender that only writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl PushNotifier for LogNotifier {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(device_token, title, body, "Push notification (not delivered)");
        Ok(())
    }
}

/// Sends notifications to logged-in users.
#[derive(Clone)]
pub struct NotificationService {
    storage: Arc<dyn StorageBackend>,
    notifier: Arc<dyn PushNotifier>,
}

impl NotificationService {
    pub fn new(storage: Arc<dyn StorageBackend>, notifier: Arc<dyn PushNotifier>) -> Self {
        Self { storage, notifier }
    }

    pub async fn send_to_user(&self, user_id: &str, title: &str, body: &str) -> ServiceResult<()> {
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("User {} not found", user_id)));
        }
        let device_token = self
            .storage
            .get_session_by_user(user_id)
            .await?
            .and_then(|s| s.device_token)
            .ok_or_else(|| ServiceError::not_found("User is not logged in"))?;

        self.notifier
            .send(&device_token, title, body)
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))
    }

    /// Notify every session with a device token. Returns how many were delivered.
    pub async fn send_to_all(&self, title: &str, body: &str) -> ServiceResult<usize> {
        let sessions = self.storage.list_sessions().await?;
        let mut delivered = 0;
        for session in sessions {
            let Some(device_token) = session.device_token else {
                continue;
            };
            match self.notifier.send(&device_token, title, body).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to notify user {}: {}", session.user_id, e),
            }
        }
        info!("Sent \"{}\" to {} devices", title, delivered);
        Ok(delivered)
    }

    /// Remind each attendee of an event starting on `date`.
    pub async fn notify_attendees_of(&self, date: chrono::NaiveDate) -> ServiceResult<usize> {
        let attendees = self.storage.attendees_of_events_starting(date).await?;
        let mut delivered = 0;
        for user_id in attendees {
            match self
                .send_to_user(&user_id, NEAR_EVENTS_TITLE, NEAR_EVENTS_BODY)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => debug!("Skipping near-events notification for {}: {}", user_id, e),
            }
        }
        info!("Notified {} users of events starting on {}", delivered, date);
        Ok(delivered)
    }
}

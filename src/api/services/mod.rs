//! Services module - contains the business logic behind the HTTP routes.

pub mod agenda_service;
pub mod assistance_service;
pub mod error;
pub mod event_service;
pub mod incident_service;
pub mod jwt_service;
pub mod list_service;
pub mod notification_service;
pub mod refresh_service;
pub mod user_service;

// Re-export for convenience
pub use agenda_service::AgendaClient;
pub use assistance_service::AssistanceService;
pub use error::{ServiceError, ServiceResult};
pub use event_service::{EventSearch, EventService};
pub use incident_service::IncidentService;
pub use jwt_service::{Claims, JwtService, SharedJwtService};
pub use list_service::ListService;
pub use notification_service::{
    FcmNotifier, LogNotifier, NotificationService, NotifyError, PushNotifier,
};
pub use refresh_service::{RefreshReport, RefreshService};
pub use user_service::UserService;

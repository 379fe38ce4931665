//! Scheduled catalogue refresh.
//!
//! Each run imports upcoming events from the agenda feed and then reminds
//! users about events they attend that start tomorrow.

use super::agenda_service::AgendaClient;
use super::event_service::EventService;
use super::notification_service::NotificationService;
use anyhow::Context;
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use cron::Schedule;
use std::str::FromStr;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Parse a six-field cron expression (`sec min hour day month weekday`).
pub fn parse_schedule(expression: &str) -> Result<Schedule, cron::error::Error> {
    Schedule::from_str(expression)
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub imported: usize,
    pub skipped: usize,
    pub notified: usize,
}

#[derive(Clone)]
pub struct RefreshService {
    agenda: AgendaClient,
    events: EventService,
    notifications: NotificationService,
}

impl RefreshService {
    pub fn new(
        agenda: AgendaClient,
        events: EventService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            agenda,
            events,
            notifications,
        }
    }

    /// Fetch and store new events. Returns (inserted, skipped).
    pub async fn import_events(&self) -> anyhow::Result<(usize, usize)> {
        let fetched = self
            .agenda
            .fetch_upcoming()
            .await
            .context("Failed to fetch agenda events")?;

        let (mut imported, mut skipped) = (0, 0);
        for details in &fetched {
            if self.events.import(details).await? {
                imported += 1;
            } else {
                skipped += 1;
            }
        }
        info!(
            "Agenda import finished: {} inserted, {} already known",
            imported, skipped
        );
        Ok((imported, skipped))
    }

    /// Remind attendees of events starting the day after `today`.
    pub async fn notify_near_events(&self, today: NaiveDate) -> anyhow::Result<usize> {
        let tomorrow = today + ChronoDuration::days(1);
        Ok(self.notifications.notify_attendees_of(tomorrow).await?)
    }

    /// Run the import followed by the near-events check. A failed import
    /// does not prevent notifications.
    pub async fn run_once(&self, today: NaiveDate) -> RefreshReport {
        let mut report = RefreshReport::default();
        match self.import_events().await {
            Ok((imported, skipped)) => {
                report.imported = imported;
                report.skipped = skipped;
            }
            Err(e) => error!("Agenda import failed: {:#}", e),
        }
        match self.notify_near_events(today).await {
            Ok(notified) => report.notified = notified,
            Err(e) => error!("Near-events notification failed: {:#}", e),
        }
        report
    }

    /// Run the refresh on `schedule` in a background task.
    pub fn spawn(self, schedule: Schedule, run_on_startup: bool) -> JoinHandle<()> {
        tokio::spawn(async move {
            if run_on_startup {
                info!("Running startup agenda refresh");
                self.run_once(Local::now().date_naive()).await;
            }
            loop {
                let Some(next) = schedule.upcoming(Local).next() else {
                    warn!("Refresh schedule has no upcoming runs; stopping scheduler");
                    return;
                };
                let wait = (next - Local::now()).to_std().unwrap_or_default();
                info!("Next agenda refresh at {}", next);
                tokio::time::sleep(wait).await;
                self.run_once(Local::now().date_naive()).await;
            }
        })
    }
}

//! Outbox relay: delivers mail for events committed alongside their records.
//!
//! Delivery is at-least-once. A failed send is retried with exponential
//! backoff until [`OUTBOX_MAX_ATTEMPTS`], then the event is marked failed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::domain::repository::{MailSender, OutboxRepository};
use crate::domain::types::{
    OUTBOX_BASE_BACKOFF_SECS, OUTBOX_BATCH_SIZE, OUTBOX_MAX_ATTEMPTS, OUTBOX_MAX_BACKOFF_SECS,
    PendingOutboxEvent,
};
use crate::error::SiteError;
use crate::infra::mailer::{MailSettings, compose};

/// Delay before the next attempt, given the number of attempts made so far.
pub fn backoff(attempts: i32) -> chrono::Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    let secs = OUTBOX_BASE_BACKOFF_SECS
        .saturating_mul(2i64.saturating_pow(exponent))
        .min(OUTBOX_MAX_BACKOFF_SECS);
    chrono::Duration::seconds(secs)
}

/// Counts from one relay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: usize,
    pub retried: usize,
    pub failed: usize,
}

pub struct OutboxRelay<R, M>
where
    R: OutboxRepository,
    M: MailSender,
{
    pub outbox: R,
    pub mailer: M,
    pub settings: MailSettings,
}

impl<R, M> OutboxRelay<R, M>
where
    R: OutboxRepository,
    M: MailSender,
{
    /// Deliver every event due at `now`, up to one batch.
    pub async fn process_batch(&self, now: DateTime<Utc>) -> Result<BatchReport, SiteError> {
        let events = self.outbox.fetch_due(now, OUTBOX_BATCH_SIZE).await?;
        let mut report = BatchReport::default();
        for event in events {
            self.deliver(event, now, &mut report).await?;
        }
        Ok(report)
    }

    async fn deliver(
        &self,
        event: PendingOutboxEvent,
        now: DateTime<Utc>,
        report: &mut BatchReport,
    ) -> Result<(), SiteError> {
        let attempts = event.attempts + 1;

        let mail = match compose(&event, &self.settings) {
            Ok(mail) => mail,
            Err(e) => {
                error!(event_id = %event.id, kind = %event.kind, error = %e, "outbox event cannot be delivered");
                self.outbox
                    .mark_failed(event.id, attempts, &e.to_string(), now)
                    .await?;
                report.failed += 1;
                return Ok(());
            }
        };

        match self.mailer.send(&mail).await {
            Ok(()) => {
                self.outbox.mark_processed(event.id, now).await?;
                info!(event_id = %event.id, kind = %event.kind, "outbox event delivered");
                report.sent += 1;
            }
            Err(e) if attempts >= OUTBOX_MAX_ATTEMPTS => {
                error!(event_id = %event.id, kind = %event.kind, attempts, error = %format!("{e:#}"), "outbox event failed permanently");
                self.outbox
                    .mark_failed(event.id, attempts, &format!("{e:#}"), now)
                    .await?;
                report.failed += 1;
            }
            Err(e) => {
                let next_attempt_at = now + backoff(attempts);
                warn!(event_id = %event.id, kind = %event.kind, attempts, %next_attempt_at, error = %format!("{e:#}"), "outbox delivery failed, will retry");
                self.outbox
                    .schedule_retry(event.id, attempts, &format!("{e:#}"), next_attempt_at)
                    .await?;
                report.retried += 1;
            }
        }
        Ok(())
    }

    /// Poll forever. Errors are logged and the loop carries on.
    pub async fn run(self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(poll_interval_secs = poll_interval.as_secs(), "outbox relay started");
        loop {
            ticker.tick().await;
            if let Err(e) = self.process_batch(Utc::now()).await {
                error!(error = ?e, "outbox relay pass failed");
            }
        }
    }
}

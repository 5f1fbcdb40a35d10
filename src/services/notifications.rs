//! notifications.rs
//!
//! Отправка писем через очередь в Redis. Сам почтовый воркер внешний:
//! здесь только кладём задачу `{subject, message, from_email, recipient_list}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use crate::models::ReservationWithTickets;
use crate::redis_client::RedisClient;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("recipient list is empty")]
    NoRecipients,
    #[error("failed to encode email job")]
    Encode(#[from] serde_json::Error),
    #[error("email queue is unavailable")]
    Queue(#[from] redis::RedisError),
}

/// Задача для почтового воркера
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmailJob {
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    pub message: String,
    #[validate(email)]
    pub from_email: String,
    pub recipient_list: Vec<String>,
}

#[derive(Clone)]
pub struct Notifier {
    redis: RedisClient,
    queue_key: String,
    from_email: String,
}

impl Notifier {
    pub fn new(redis: RedisClient, queue_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            redis,
            queue_key: queue_key.into(),
            from_email: from_email.into(),
        }
    }

    pub fn from_email(&self) -> &str {
        &self.from_email
    }

    pub async fn send_email(&self, job: &EmailJob) -> Result<(), NotificationError> {
        let payload = encode_job(job)?;
        let queued = self.redis.enqueue(&self.queue_key, &payload).await?;
        info!(queue = %self.queue_key, queued, subject = %job.subject, "email job enqueued");
        Ok(())
    }

    /// Fire-and-forget: ошибка только логируется
    pub fn spawn_send(&self, job: EmailJob) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_email(&job).await {
                error!("failed to enqueue email {:?}: {:?}", job.subject, e);
            }
        });
    }

    pub fn reservation_confirmation(
        &self,
        reservation: &ReservationWithTickets,
        recipient: &str,
    ) -> EmailJob {
        reservation_confirmation(&self.from_email, reservation, recipient)
    }
}

fn encode_job(job: &EmailJob) -> Result<String, NotificationError> {
    if job.recipient_list.is_empty() {
        return Err(NotificationError::NoRecipients);
    }
    Ok(serde_json::to_string(job)?)
}

fn reservation_confirmation(
    from_email: &str,
    reservation: &ReservationWithTickets,
    recipient: &str,
) -> EmailJob {
    let mut message = format!(
        "Your reservation #{} from {} is confirmed.\n\nTickets:\n",
        reservation.reservation.id,
        reservation.reservation.created_at.format("%Y-%m-%d %H:%M UTC"),
    );
    for ticket in &reservation.tickets {
        message.push_str(&format!("  - {ticket}\n"));
    }

    EmailJob {
        subject: format!("Reservation #{} confirmed", reservation.reservation.id),
        message,
        from_email: from_email.to_string(),
        recipient_list: vec![recipient.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reservation, Ticket};
    use chrono::{TimeZone, Utc};

    fn reservation() -> ReservationWithTickets {
        ReservationWithTickets {
            reservation: Reservation {
                id: 12,
                user_id: 1,
                created_at: Utc.with_ymd_and_hms(2024, 8, 1, 12, 30, 0).unwrap(),
            },
            tickets: vec![
                Ticket { id: 1, row: 5, seat: 10, performance_id: 3, reservation_id: 12 },
                Ticket { id: 2, row: 1, seat: 1, performance_id: 3, reservation_id: 12 },
            ],
        }
    }

    #[test]
    fn confirmation_lists_every_ticket() {
        let job = reservation_confirmation("box-office@theatre.local", &reservation(), "user@test.com");

        assert_eq!(job.subject, "Reservation #12 confirmed");
        assert_eq!(job.recipient_list, vec!["user@test.com".to_string()]);
        assert!(job.message.contains("2024-08-01 12:30 UTC"));
        assert!(job.message.contains("performance #3 (row: 5, seat: 10)"));
        assert!(job.message.contains("performance #3 (row: 1, seat: 1)"));
    }

    #[test]
    fn job_is_encoded_with_worker_field_names() {
        let job = EmailJob {
            subject: "Notification Subject".into(),
            message: "This is a notification message.".into(),
            from_email: "box-office@theatre.local".into(),
            recipient_list: vec!["recipient@example.com".into()],
        };

        let payload: serde_json::Value = serde_json::from_str(&encode_job(&job).unwrap()).unwrap();
        assert_eq!(payload["subject"], "Notification Subject");
        assert_eq!(payload["recipient_list"][0], "recipient@example.com");
        assert_eq!(payload["from_email"], "box-office@theatre.local");
    }

    #[test]
    fn job_without_recipients_is_refused() {
        let job = EmailJob {
            subject: "s".into(),
            message: "m".into(),
            from_email: "a@b.c".into(),
            recipient_list: vec![],
        };
        assert!(matches!(encode_job(&job), Err(NotificationError::NoRecipients)));
    }
}

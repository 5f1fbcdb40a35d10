use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};
use std::collections::BTreeMap;

use crate::models::Ticket;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Reservation {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Бронь вместе с билетами - то, что видит клиент
#[derive(Debug, Clone, Serialize)]
pub struct ReservationWithTickets {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub tickets: Vec<Ticket>,
}

impl Reservation {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<ReservationWithTickets>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT r.id AS rid, r.created_at,
                   t.id AS tid, t.row, t.seat, t.performance_id
            FROM reservations r
            LEFT JOIN tickets t ON t.reservation_id = r.id
            WHERE r.user_id = $1
            ORDER BY r.id, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut map: BTreeMap<i64, ReservationWithTickets> = BTreeMap::new();
        for r in rows {
            let rid: i64 = r.try_get("rid")?;
            let created_at: DateTime<Utc> = r.try_get("created_at")?;
            let entry = map.entry(rid).or_insert_with(|| ReservationWithTickets {
                reservation: Reservation { id: rid, user_id, created_at },
                tickets: Vec::new(),
            });
            if let Some(tid) = r.try_get::<Option<i64>, _>("tid")? {
                entry.tickets.push(Ticket {
                    id: tid,
                    row: r.try_get("row")?,
                    seat: r.try_get("seat")?,
                    performance_id: r.try_get("performance_id")?,
                    reservation_id: rid,
                });
            }
        }

        // id растут вместе с created_at: новые сверху
        Ok(map.into_values().rev().collect())
    }
}

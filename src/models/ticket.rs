use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    #[serde(rename = "performance")]
    pub performance_id: i64,
    #[serde(rename = "reservation")]
    pub reservation_id: i64,
}

/// Билет пользователя в списке /tickets/
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketListItem {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
    pub reservation: i64,
    pub play_title: String,
    pub hall_name: String,
    pub show_time: NaiveDateTime,
}

impl Ticket {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        performance: Option<i64>,
    ) -> Result<Vec<TicketListItem>, sqlx::Error> {
        sqlx::query_as::<_, TicketListItem>(
            r#"
            SELECT t.id, t.row, t.seat,
                   t.performance_id AS performance, t.reservation_id AS reservation,
                   pl.title AS play_title, h.name AS hall_name, p.show_time
            FROM tickets t
            JOIN reservations r ON r.id = t.reservation_id
            JOIN performances p ON p.id = t.performance_id
            JOIN plays pl ON pl.id = p.play_id
            JOIN halls h ON h.id = p.hall_id
            WHERE r.user_id = $1
              AND ($2::BIGINT IS NULL OR t.performance_id = $2)
            ORDER BY p.show_time, t.row, t.seat
            "#,
        )
        .bind(user_id)
        .bind(performance)
        .fetch_all(pool)
        .await
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "performance #{} (row: {}, seat: {})", self.performance_id, self.row, self.seat)
    }
}

impl fmt::Display for TicketListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (row: {}, seat: {})",
            self.play_title,
            self.show_time.format("%Y-%m-%d %H:%M:%S"),
            self.row,
            self.seat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ticket_serializes_references_by_id() {
        let ticket = Ticket { id: 9, row: 5, seat: 10, performance_id: 2, reservation_id: 4 };
        let body = serde_json::to_value(&ticket).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"id": 9, "row": 5, "seat": 10, "performance": 2, "reservation": 4})
        );
        assert_eq!(ticket.to_string(), "performance #2 (row: 5, seat: 10)");
    }

    #[test]
    fn listed_ticket_displays_play_and_place() {
        let item = TicketListItem {
            id: 1,
            row: 5,
            seat: 10,
            performance: 2,
            reservation: 3,
            play_title: "Hamlet".into(),
            hall_name: "Main Hall".into(),
            show_time: NaiveDate::from_ymd_opt(2024, 8, 1)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
        };
        assert_eq!(item.to_string(), "Hamlet 2024-08-01 19:00:00 (row: 5, seat: 10)");
    }
}

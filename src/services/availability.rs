//! Свободные места спектакля: вместимость зала минус выданные билеты.
//!
//! Capacity and ticket count are read in the same statement so a reservation
//! committing in between cannot skew the result. The value is never stored.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::warn;

/// Фильтры списка спектаклей
#[derive(Debug, Clone, Default)]
pub struct PerformanceFilter {
    pub date: Option<NaiveDate>,
    pub play: Option<i64>,
}

#[derive(Debug, FromRow)]
struct SeatCountRow {
    capacity: i64,
    booked: i64,
}

#[derive(Debug, FromRow)]
struct PerformanceListRow {
    id: i64,
    show_time: NaiveDateTime,
    play_id: i64,
    play_title: String,
    hall_id: i64,
    hall_name: String,
    hall_capacity: i64,
    booked: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceListItem {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub play: i64,
    pub play_title: String,
    pub theatre_hall: i64,
    pub theatre_hall_name: String,
    pub theatre_hall_capacity: i64,
    pub tickets_available: i64,
}

/// Capacity minus booked. A negative result means the seat uniqueness
/// invariant was broken outside this service; it is logged and returned as is.
pub fn seats_left(performance_id: i64, capacity: i64, booked: i64) -> i64 {
    let left = capacity - booked;
    if left < 0 {
        warn!(
            performance_id,
            capacity,
            booked,
            "performance is overbooked: more tickets than seats in the hall"
        );
    }
    left
}

/// `None` если спектакля нет.
pub async fn available_seats(pool: &PgPool, performance_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query_as::<_, SeatCountRow>(
        r#"
        SELECT (h.rows::BIGINT * h.seats_in_row::BIGINT) AS capacity,
               (SELECT COUNT(*) FROM tickets t WHERE t.performance_id = p.id) AS booked
        FROM performances p
        JOIN halls h ON h.id = p.hall_id
        WHERE p.id = $1
        "#,
    )
    .bind(performance_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| seats_left(performance_id, r.capacity, r.booked)))
}

pub async fn list_performances(
    pool: &PgPool,
    filter: &PerformanceFilter,
) -> Result<Vec<PerformanceListItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PerformanceListRow>(
        r#"
        SELECT p.id, p.show_time,
               pl.id AS play_id, pl.title AS play_title,
               h.id AS hall_id, h.name AS hall_name,
               (h.rows::BIGINT * h.seats_in_row::BIGINT) AS hall_capacity,
               COUNT(t.id) AS booked
        FROM performances p
        JOIN plays pl ON pl.id = p.play_id
        JOIN halls h ON h.id = p.hall_id
        LEFT JOIN tickets t ON t.performance_id = p.id
        WHERE ($1::DATE IS NULL OR p.show_time::DATE = $1)
          AND ($2::BIGINT IS NULL OR p.play_id = $2)
        GROUP BY p.id, pl.id, h.id
        ORDER BY p.show_time, p.id
        "#,
    )
    .bind(filter.date)
    .bind(filter.play)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PerformanceListRow::into_item).collect())
}

impl PerformanceListRow {
    fn into_item(self) -> PerformanceListItem {
        PerformanceListItem {
            tickets_available: seats_left(self.id, self.hall_capacity, self.booked),
            id: self.id,
            show_time: self.show_time,
            play: self.play_id,
            play_title: self.play_title,
            theatre_hall: self.hall_id,
            theatre_hall_name: self.hall_name,
            theatre_hall_capacity: self.hall_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_performance_has_the_whole_hall() {
        assert_eq!(seats_left(1, 200, 0), 200);
    }

    #[test]
    fn two_tickets_leave_198() {
        assert_eq!(seats_left(1, 200, 2), 198);
    }

    #[test]
    fn overbooking_is_not_clamped() {
        assert_eq!(seats_left(1, 4, 6), -2);
    }

    #[test]
    fn list_item_is_annotated_from_the_aggregate() {
        let row = PerformanceListRow {
            id: 5,
            show_time: NaiveDate::from_ymd_opt(2024, 8, 1)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
            play_id: 2,
            play_title: "Hamlet".into(),
            hall_id: 3,
            hall_name: "Main Hall".into(),
            hall_capacity: 200,
            booked: 2,
        };

        let item = row.into_item();
        assert_eq!(item.tickets_available, 198);
        assert_eq!(item.theatre_hall_capacity, 200);

        let body = serde_json::to_value(&item).unwrap();
        assert_eq!(body["tickets_available"], 198);
        assert_eq!(body["play_title"], "Hamlet");
    }
}

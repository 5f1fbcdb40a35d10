use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;

use crate::error::AppError;
use crate::models::{Hall, Play};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Performance {
    pub id: i64,
    #[serde(rename = "play")]
    pub play_id: i64,
    #[serde(rename = "theatre_hall")]
    pub hall_id: i64,
    pub show_time: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPerformance {
    pub play: i64,
    #[serde(alias = "theatre_hall")]
    pub hall: i64,
    pub show_time: NaiveDateTime,
}

/// Занятое место: (row, seat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct TakenPlace {
    pub row: i32,
    pub seat: i32,
}

/// Спектакль вместе с пьесой и залом, одной строкой из JOIN
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceWithRelations {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub play_id: i64,
    pub play_title: String,
    pub play_description: String,
    pub hall_id: i64,
    pub hall_name: String,
    pub hall_rows: i32,
    pub hall_seats_in_row: i32,
}

impl Performance {
    pub async fn create(pool: &PgPool, new_performance: &NewPerformance) -> Result<Performance, AppError> {
        let result = sqlx::query_as::<_, Performance>(
            "INSERT INTO performances (play_id, hall_id, show_time)
             VALUES ($1, $2, $3)
             RETURNING id, play_id, hall_id, show_time",
        )
        .bind(new_performance.play)
        .bind(new_performance.hall)
        .bind(new_performance.show_time)
        .fetch_one(pool)
        .await;

        match result {
            Ok(performance) => Ok(performance),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Err(
                AppError::validation("play and theatre_hall must reference existing records"),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_with_relations(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<PerformanceWithRelations>, sqlx::Error> {
        sqlx::query_as::<_, PerformanceWithRelations>(
            r#"
            SELECT p.id, p.show_time,
                   pl.id AS play_id, pl.title AS play_title, pl.description AS play_description,
                   h.id AS hall_id, h.name AS hall_name,
                   h.rows AS hall_rows, h.seats_in_row AS hall_seats_in_row
            FROM performances p
            JOIN plays pl ON pl.id = p.play_id
            JOIN halls h ON h.id = p.hall_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn taken_places(pool: &PgPool, id: i64) -> Result<Vec<TakenPlace>, sqlx::Error> {
        sqlx::query_as::<_, TakenPlace>(
            "SELECT row, seat FROM tickets WHERE performance_id = $1 ORDER BY row, seat",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }
}

impl PerformanceWithRelations {
    pub fn play(&self) -> Play {
        Play {
            id: self.play_id,
            title: self.play_title.clone(),
            description: self.play_description.clone(),
        }
    }

    pub fn hall(&self) -> Hall {
        Hall {
            id: self.hall_id,
            name: self.hall_name.clone(),
            rows: self.hall_rows,
            seats_in_row: self.hall_seats_in_row,
        }
    }
}

impl fmt::Display for PerformanceWithRelations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.play_title, self.show_time.format("%Y-%m-%d %H:%M:%S"))
    }
}

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::{FromRow, PgPool};
use std::fmt;
use validator::Validate;

use crate::error::AppError;

/// Зал: сетка rows × seats_in_row. Вместимость всегда вычисляется.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Hall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewHall {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, message = "rows must be a positive integer"))]
    pub rows: i32,
    #[validate(range(min = 1, message = "seats_in_row must be a positive integer"))]
    pub seats_in_row: i32,
}

impl Hall {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    pub async fn create(pool: &PgPool, new_hall: NewHall) -> Result<Hall, AppError> {
        new_hall.validate()?;

        let hall = sqlx::query_as::<_, Hall>(
            "INSERT INTO halls (name, rows, seats_in_row)
             VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(&new_hall.name)
        .bind(new_hall.rows)
        .bind(new_hall.seats_in_row)
        .fetch_one(pool)
        .await?;

        tracing::info!(hall_id = hall.id, capacity = hall.capacity(), "hall created");
        Ok(hall)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Hall>, sqlx::Error> {
        sqlx::query_as::<_, Hall>("SELECT id, name, rows, seats_in_row FROM halls ORDER BY id")
            .fetch_all(pool)
            .await
    }
}

impl fmt::Display for Hall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// capacity отдаётся клиенту, но не хранится
impl Serialize for Hall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Hall", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("seats_in_row", &self.seats_in_row)?;
        state.serialize_field("capacity", &self.capacity())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{faker::company::en::CompanyName, Fake};
    use proptest::prelude::*;

    fn hall(rows: i32, seats_in_row: i32) -> Hall {
        Hall { id: 1, name: CompanyName().fake(), rows, seats_in_row }
    }

    #[test]
    fn main_hall_capacity() {
        assert_eq!(hall(10, 20).capacity(), 200);
    }

    #[test]
    fn display_is_the_hall_name() {
        let h = Hall { id: 3, name: "Main Hall".into(), rows: 10, seats_in_row: 20 };
        assert_eq!(h.to_string(), "Main Hall");
    }

    #[test]
    fn serialized_hall_carries_capacity() {
        let h = Hall { id: 3, name: "Main Hall".into(), rows: 10, seats_in_row: 20 };
        let value = serde_json::to_value(&h).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "name": "Main Hall",
                "rows": 10,
                "seats_in_row": 20,
                "capacity": 200
            })
        );
    }

    #[test]
    fn new_hall_rejects_non_positive_dimensions() {
        let zero_rows = NewHall { name: "Studio".into(), rows: 0, seats_in_row: 10 };
        let errors = zero_rows.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rows"));

        let negative_seats = NewHall { name: "Studio".into(), rows: 4, seats_in_row: -2 };
        let errors = negative_seats.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("seats_in_row"));

        let ok = NewHall { name: "Studio".into(), rows: 4, seats_in_row: 12 };
        assert!(ok.validate().is_ok());
    }

    proptest! {
        #[test]
        fn capacity_is_rows_times_seats(rows in 1..=i32::MAX, seats in 1..=i32::MAX) {
            prop_assert_eq!(hall(rows, seats).capacity(), rows as i64 * seats as i64);
        }
    }
}

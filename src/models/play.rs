use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Play {
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlay {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}

impl Play {
    /// Создаёт пьесу вместе со связями на жанры и актёров в одной транзакции.
    pub async fn create(pool: &PgPool, new_play: NewPlay) -> Result<Play, AppError> {
        new_play.validate()?;

        let mut tx = pool.begin().await?;

        let play = sqlx::query_as::<_, Play>(
            "INSERT INTO plays (title, description) VALUES ($1, $2)
             RETURNING id, title, description",
        )
        .bind(&new_play.title)
        .bind(&new_play.description)
        .fetch_one(&mut *tx)
        .await?;

        // unnest + JOIN отбрасывает несуществующие id, поэтому сверяем количество
        let genres = sqlx::query(
            "INSERT INTO play_genres (play_id, genre_id)
             SELECT $1, g.id FROM genres g WHERE g.id = ANY($2)",
        )
        .bind(play.id)
        .bind(&new_play.genres)
        .execute(&mut *tx)
        .await?;
        if genres.rows_affected() as usize != distinct_count(&new_play.genres) {
            // tx откатится при drop
            return Err(AppError::validation("genres contain an unknown id"));
        }

        let actors = sqlx::query(
            "INSERT INTO play_actors (play_id, actor_id)
             SELECT $1, a.id FROM actors a WHERE a.id = ANY($2)",
        )
        .bind(play.id)
        .bind(&new_play.actors)
        .execute(&mut *tx)
        .await?;
        if actors.rows_affected() as usize != distinct_count(&new_play.actors) {
            // tx откатится при drop
            return Err(AppError::validation("actors contain an unknown id"));
        }

        tx.commit().await?;
        Ok(play)
    }

    /// `title` фильтрует по вхождению без учёта регистра; `%` и `_` в нём
    /// ищутся буквально.
    pub async fn list(pool: &PgPool, title: Option<&str>) -> Result<Vec<Play>, sqlx::Error> {
        sqlx::query_as::<_, Play>(
            "SELECT id, title, description FROM plays
             WHERE ($1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\\')
             ORDER BY id",
        )
        .bind(title.map(contains_pattern))
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Play>, sqlx::Error> {
        sqlx::query_as::<_, Play>("SELECT id, title, description FROM plays WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn genre_names(pool: &PgPool, id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT g.name FROM genres g
             JOIN play_genres pg ON pg.genre_id = g.id
             WHERE pg.play_id = $1
             ORDER BY g.name",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    pub async fn actor_names(pool: &PgPool, id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT a.first_name || ' ' || a.last_name FROM actors a
             JOIN play_actors pa ON pa.actor_id = a.id
             WHERE pa.play_id = $1
             ORDER BY a.last_name, a.first_name",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }
}

/// `%fragment%` с экранированными спецсимволами LIKE
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn distinct_count(ids: &[i64]) -> usize {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_links_are_counted_once() {
        assert_eq!(distinct_count(&[3, 1, 3, 2, 1]), 3);
        assert_eq!(distinct_count(&[]), 0);
    }

    #[test]
    fn title_filter_matches_wildcards_literally() {
        assert_eq!(contains_pattern("ham"), "%ham%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn new_play_defaults_optional_fields() {
        let play: NewPlay = serde_json::from_str(r#"{"title": "Hamlet"}"#).unwrap();
        assert_eq!(play.description, "");
        assert!(play.genres.is_empty() && play.actors.is_empty());
        assert!(play.validate().is_ok());
    }
}

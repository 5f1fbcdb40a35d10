use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::performance::{NewPerformance, TakenPlace};
use crate::models::{Hall, Performance, Play};
use crate::services::availability::{self, PerformanceFilter};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/performances/", get(list_performances).post(create_performance))
        .route("/performances/{id}/", get(get_performance))
}

#[derive(Debug, Deserialize)]
pub struct PerformancesQuery {
    pub date: Option<String>,
    pub play: Option<String>,
}

#[derive(Debug, Serialize)]
struct PerformanceDetailResponse {
    id: i64,
    show_time: NaiveDateTime,
    play: Play,
    theatre_hall: Hall,
    taken_places: Vec<TakenPlace>,
    tickets_available: i64,
}

impl PerformancesQuery {
    /// Пустые параметры игнорируются, кривые - 400
    pub fn into_filter(self) -> Result<PerformanceFilter, AppError> {
        let date = match self.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| AppError::validation("date must be in YYYY-MM-DD format"))?,
            ),
            None => None,
        };
        let play = match self.play.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::validation("play must be an integer id"))?,
            ),
            None => None,
        };
        Ok(PerformanceFilter { date, play })
    }
}

// GET /api/performances/?date=YYYY-MM-DD&play=<id>
async fn list_performances(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PerformancesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter()?;
    let performances = availability::list_performances(&state.db.pool, &filter).await?;
    Ok(Json(performances))
}

// POST /api/performances/
async fn create_performance(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(req): ApiJson<NewPerformance>,
) -> Result<impl IntoResponse, AppError> {
    let performance = Performance::create(&state.db.pool, &req).await?;
    tracing::info!(performance_id = performance.id, "performance scheduled");
    Ok((StatusCode::CREATED, Json(performance)))
}

// GET /api/performances/{id}/
async fn get_performance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pool = &state.db.pool;
    let (performance, taken_places) = futures::try_join!(
        Performance::find_with_relations(pool, id),
        Performance::taken_places(pool, id),
    )?;

    let performance =
        performance.ok_or_else(|| AppError::not_found(format!("performance {id} not found")))?;
    let hall = performance.hall();
    // зал неизменяем, поэтому capacity и список занятых мест согласованы
    let tickets_available =
        availability::seats_left(id, hall.capacity(), taken_places.len() as i64);

    Ok(Json(PerformanceDetailResponse {
        id: performance.id,
        show_time: performance.show_time,
        play: performance.play(),
        theatre_hall: hall,
        taken_places,
        tickets_available,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(date: Option<&str>, play: Option<&str>) -> PerformancesQuery {
        PerformancesQuery {
            date: date.map(String::from),
            play: play.map(String::from),
        }
    }

    #[test]
    fn filter_parses_date_and_play() {
        let filter = query(Some("2024-08-01"), Some("3")).into_filter().unwrap();
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 8, 1));
        assert_eq!(filter.play, Some(3));
    }

    #[test]
    fn blank_parameters_mean_no_filter() {
        let filter = query(Some(""), Some("  ")).into_filter().unwrap();
        assert!(filter.date.is_none() && filter.play.is_none());
    }

    #[test]
    fn malformed_parameters_are_bad_requests() {
        assert!(matches!(
            query(Some("01.08.2024"), None).into_filter(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            query(None, Some("hamlet")).into_filter(),
            Err(AppError::Validation(_))
        ));
    }
}

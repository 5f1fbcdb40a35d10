use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::{hall::NewHall, Hall};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/halls/", get(list_halls).post(create_hall))
}

// GET /api/halls/
async fn list_halls(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let halls = Hall::list(&state.db.pool).await?;
    Ok(Json(halls))
}

// POST /api/halls/
async fn create_hall(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(req): ApiJson<NewHall>,
) -> Result<impl IntoResponse, AppError> {
    let hall = Hall::create(&state.db.pool, req).await?;
    Ok((StatusCode::CREATED, Json(hall)))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::{play::NewPlay, Play};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plays/", get(list_plays).post(create_play))
        .route("/plays/{id}/", get(get_play))
}

#[derive(Debug, Deserialize)]
struct PlaysQuery {
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlayDetailResponse {
    #[serde(flatten)]
    play: Play,
    genres: Vec<String>,
    actors: Vec<String>,
}

// GET /api/plays/?title=
async fn list_plays(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaysQuery>,
) -> Result<impl IntoResponse, AppError> {
    let title = params.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let plays = Play::list(&state.db.pool, title).await?;
    Ok(Json(plays))
}

// POST /api/plays/
async fn create_play(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(req): ApiJson<NewPlay>,
) -> Result<impl IntoResponse, AppError> {
    let play = Play::create(&state.db.pool, req).await?;
    Ok((StatusCode::CREATED, Json(play)))
}

// GET /api/plays/{id}/
async fn get_play(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pool = &state.db.pool;
    let (play, genres, actors) = futures::try_join!(
        Play::find(pool, id),
        Play::genre_names(pool, id),
        Play::actor_names(pool, id),
    )?;

    let play = play.ok_or_else(|| AppError::not_found(format!("play {id} not found")))?;
    Ok(Json(PlayDetailResponse { play, genres, actors }))
}

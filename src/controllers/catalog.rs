use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::catalog::{ActorResponse, NewActor, NewGenre};
use crate::models::{Actor, Genre};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres/", get(list_genres).post(create_genre))
        .route("/actors/", get(list_actors).post(create_actor))
}

/* ---------- GENRES ---------- */

async fn list_genres(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(Genre::list(&state.db.pool).await?))
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(req): ApiJson<NewGenre>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    match Genre::create(&state.db.pool, &req).await {
        Ok(genre) => Ok((StatusCode::CREATED, Json(genre))),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::validation("genre with this name already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/* ---------- ACTORS ---------- */

async fn list_actors(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let actors: Vec<ActorResponse> = Actor::list(&state.db.pool)
        .await?
        .into_iter()
        .map(ActorResponse::from)
        .collect();
    Ok(Json(actors))
}

async fn create_actor(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(req): ApiJson<NewActor>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let actor = Actor::create(&state.db.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(ActorResponse::from(actor))))
}

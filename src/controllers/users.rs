use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::user::{NewUser, UpdateProfile, UserProfile};
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/", post(register_user))
        .route("/users/me/", get(me).put(update_me).patch(update_me))
}

// POST /api/users/
async fn register_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::register(&state.db.pool, req).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

// GET /api/users/me/
async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = User::find(&state.db.pool, user.id)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(profile))
}

// PUT/PATCH /api/users/me/ - обновляются только переданные поля
async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdateProfile>,
) -> Result<impl IntoResponse, AppError> {
    let profile = User::update_profile(&state.db.pool, user.id, req)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(profile))
}

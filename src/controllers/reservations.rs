use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::Reservation;
use crate::services::reservations::{self, NewReservation};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/reservations/", get(list_reservations).post(create_reservation))
}

// GET /api/reservations/ - брони текущего пользователя, новые сверху
async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let reservations = Reservation::list_for_user(&state.db.pool, user.id).await?;
    Ok(Json(reservations))
}

// POST /api/reservations/
async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<NewReservation>,
) -> Result<impl IntoResponse, AppError> {
    let created = reservations::create_reservation(&state.db.pool, user.id, &req.tickets).await?;

    // письмо уходит после коммита и не задерживает ответ
    if state.config.mail.reservation_emails {
        let job = state.notifier.reservation_confirmation(&created, &user.email);
        state.notifier.spawn_send(job);
    }

    Ok((StatusCode::CREATED, Json(created)))
}

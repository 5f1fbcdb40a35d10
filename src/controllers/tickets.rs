use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::Ticket;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tickets/", get(list_tickets))
}

#[derive(Debug, Deserialize)]
struct TicketsQuery {
    performance: Option<i64>,
}

// GET /api/tickets/ - только чтение, только свои билеты
async fn list_tickets(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<TicketsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tickets = Ticket::list_for_user(&state.db.pool, user.id, params.performance).await?;
    Ok(Json(tickets))
}

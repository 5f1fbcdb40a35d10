pub mod catalog;
pub mod halls;
pub mod notifications;
pub mod performances;
pub mod plays;
pub mod reservations;
pub mod tickets;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(halls::routes())
        .merge(catalog::routes())
        .merge(plays::routes())
        .merge(performances::routes())
        .merge(reservations::routes())
        .merge(tickets::routes())
        .merge(users::routes())
        .merge(notifications::routes())
}

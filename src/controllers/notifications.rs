use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{ApiJson, AuthUser};
use crate::services::notifications::EmailJob;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/notifications/send/", post(send_notification))
}

#[derive(Debug, Deserialize)]
struct SendNotificationRequest {
    subject: String,
    message: String,
    #[serde(default)]
    recipient_list: Vec<String>,
}

// POST /api/notifications/send/
async fn send_notification(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<SendNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    // без адресатов письмо уходит самому отправителю
    let recipient_list = if req.recipient_list.is_empty() {
        vec![user.email.clone()]
    } else {
        req.recipient_list
    };

    let job = EmailJob {
        subject: req.subject,
        message: req.message,
        from_email: state.notifier.from_email().to_string(),
        recipient_list,
    };
    job.validate()?;

    state.notifier.send_email(&job).await?;
    Ok(Json(json!({ "status": "Notification sent" })))
}

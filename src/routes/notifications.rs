use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::notification_dto::{NotificationPollResponse, PendingRemindersResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications/poll",
    responses(
        (status = 200, description = "Reminders fired since the last poll", body = Json<NotificationPollResponse>)
    )
)]
#[axum::debug_handler]
pub async fn poll(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.reminders.drain();
    Ok(Json(NotificationPollResponse {
        count: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/notifications/pending",
    responses(
        (status = 200, description = "Scheduled reminders", body = Json<PendingRemindersResponse>)
    )
)]
#[axum::debug_handler]
pub async fn pending(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.reminders.pending();
    Ok(Json(PendingRemindersResponse {
        count: items.len(),
        items,
    }))
}

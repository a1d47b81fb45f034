use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::meeting_dto::{
        ConflictListResponse, ConflictQuery, ConflictSummary, MeetingListQuery,
        MeetingListResponse, MeetingRequest, MeetingResponse, MeetingWriteResponse, ScopeQuery,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/meetings",
    params(
        ("scope" = Option<String>, Query, description = "hr (default) or team_leader"),
        ("refresh" = Option<bool>, Query, description = "Refetch from the backend first"),
        ("filter" = Option<String>, Query, description = "active: only live or starting soon")
    ),
    responses(
        (status = 200, description = "Meetings with display status", body = Json<MeetingListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_meetings(
    State(state): State<AppState>,
    Query(query): Query<MeetingListQuery>,
) -> Result<impl IntoResponse> {
    let only_active = query.filter.as_deref() == Some("active");
    let items: Vec<MeetingResponse> = state
        .meeting_service
        .list(query.scope, query.refresh)
        .await?
        .into_iter()
        .filter(|m| !only_active || m.status.is_active())
        .map(Into::into)
        .collect();
    Ok(Json(MeetingListResponse {
        scope: query.scope,
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    post,
    path = "/api/meetings",
    request_body = MeetingRequest,
    responses(
        (status = 201, description = "Meeting created; overlapping bookings listed", body = Json<MeetingWriteResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_meeting(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<MeetingRequest>,
) -> Result<impl IntoResponse> {
    let write = state.meeting_service.create(scope.scope, payload).await?;
    Ok((StatusCode::CREATED, Json(MeetingWriteResponse::from(write))))
}

#[utoipa::path(
    put,
    path = "/api/meetings/{id}",
    params(
        ("id" = String, Path, description = "Meeting ID"),
        ("scope" = Option<String>, Query, description = "hr (default) or team_leader")
    ),
    request_body = MeetingRequest,
    responses(
        (status = 200, description = "Meeting updated", body = Json<MeetingWriteResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Meeting not found")
    )
)]
#[axum::debug_handler]
pub async fn update_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(scope): Query<ScopeQuery>,
    Json(payload): Json<MeetingRequest>,
) -> Result<impl IntoResponse> {
    let write = state.meeting_service.update(scope.scope, &id, payload).await?;
    Ok(Json(MeetingWriteResponse::from(write)))
}

#[utoipa::path(
    delete,
    path = "/api/meetings/{id}",
    params(
        ("id" = String, Path, description = "Meeting ID"),
        ("scope" = Option<String>, Query, description = "hr (default) or team_leader")
    ),
    responses(
        (status = 204, description = "Meeting deleted, reminder cancelled"),
        (status = 404, description = "Meeting not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    state.meeting_service.delete(scope.scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/meetings/{id}/cancel",
    params(
        ("id" = String, Path, description = "Meeting ID"),
        ("scope" = Option<String>, Query, description = "hr (default) or team_leader")
    ),
    responses(
        (status = 200, description = "Meeting cancelled", body = Json<MeetingResponse>),
        (status = 404, description = "Meeting not found")
    )
)]
#[axum::debug_handler]
pub async fn cancel_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Result<impl IntoResponse> {
    let meeting = state.meeting_service.cancel(scope.scope, &id).await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

#[utoipa::path(
    get,
    path = "/api/meetings/conflicts",
    params(
        ("scope" = Option<String>, Query, description = "hr (default) or team_leader"),
        ("date" = String, Query, description = "Day of the slot"),
        ("start_time" = String, Query, description = "Slot start (HH:MM)"),
        ("end_time" = String, Query, description = "Slot end (HH:MM)"),
        ("room" = Option<String>, Query, description = "Only meetings in this room"),
        ("exclude_id" = Option<String>, Query, description = "Meeting being edited")
    ),
    responses(
        (status = 200, description = "Overlapping meetings", body = Json<ConflictListResponse>),
        (status = 400, description = "Invalid slot")
    )
)]
#[axum::debug_handler]
pub async fn list_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictQuery>,
) -> Result<impl IntoResponse> {
    let items: Vec<ConflictSummary> = state
        .meeting_service
        .conflicts(
            query.scope,
            &query.date,
            &query.start_time,
            &query.end_time,
            query.room.as_deref(),
            query.exclude_id.as_deref(),
        )
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ConflictListResponse {
        total: items.len(),
        items,
    }))
}

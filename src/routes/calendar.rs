use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::calendar_dto::{
        CalendarEntryResponse, CalendarQuery, CalendarResponse, DepartmentListResponse,
        EventFormRequest, EventFormResponse, FormQuery,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/calendar/events",
    params(
        ("layout" = Option<String>, Query, description = "composite or per_department"),
        ("from" = Option<String>, Query, description = "First day to include (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Last day to include (YYYY-MM-DD)"),
        ("department" = Option<String>, Query, description = "Only entries for this department id"),
        ("refresh" = Option<bool>, Query, description = "Refetch from the backend first")
    ),
    responses(
        (status = 200, description = "Calendar entries", body = Json<CalendarResponse>),
        (status = 502, description = "Backend unavailable")
    )
)]
#[axum::debug_handler]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse> {
    let layout = query.layout.unwrap_or(state.calendar_service.default_layout());
    let entries = state
        .calendar_service
        .entries(
            Some(layout),
            query.from,
            query.to,
            query.department.as_deref(),
            query.refresh,
        )
        .await?;
    let items: Vec<CalendarEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(CalendarResponse {
        layout,
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    post,
    path = "/api/calendar/refresh",
    responses(
        (status = 200, description = "Events refetched", body = Json<CalendarResponse>),
        (status = 502, description = "Backend unavailable, cached list cleared")
    )
)]
#[axum::debug_handler]
pub async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let layout = state.calendar_service.default_layout();
    let entries = state
        .calendar_service
        .entries(Some(layout), None, None, None, true)
        .await?;
    let items: Vec<CalendarEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(CalendarResponse {
        layout,
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/calendar/departments",
    responses(
        (status = 200, description = "Departments available for selection", body = Json<DepartmentListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_departments(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.calendar_service.departments().await?;
    Ok(Json(DepartmentListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/calendar/form",
    params(
        ("date" = String, Query, description = "Selected day (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Form state for the day", body = Json<EventFormResponse>),
        (status = 400, description = "Invalid date")
    )
)]
#[axum::debug_handler]
pub async fn get_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<impl IntoResponse> {
    let form = state.calendar_service.form_for(query.date).await?;
    Ok(Json(EventFormResponse::from(form)))
}

#[utoipa::path(
    post,
    path = "/api/calendar/form",
    request_body = EventFormRequest,
    responses(
        (status = 200, description = "Event saved, form now in edit mode", body = Json<EventFormResponse>),
        (status = 400, description = "Validation failed, nothing was sent"),
        (status = 409, description = "A save for this day is already in flight"),
        (status = 422, description = "Backend refused the event")
    )
)]
#[axum::debug_handler]
pub async fn submit_form(
    State(state): State<AppState>,
    Json(payload): Json<EventFormRequest>,
) -> Result<impl IntoResponse> {
    let form = state.calendar_service.submit(payload).await?;
    Ok(Json(EventFormResponse::from(form)))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/events/{id}",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event deleted, form back in create mode", body = Json<EventFormResponse>),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let form = state.calendar_service.delete(&id).await?;
    Ok((StatusCode::OK, Json(EventFormResponse::from(form))))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::hiring_dto::{
        JobListQuery, JobListResponse, JobPostingRequest, JobPostingResponse, WizardResponse,
        WizardSubmitResponse,
    },
    error::Result,
    models::hire::{BasicInfo, Compensation, PositionInfo},
    utils::time,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/hiring/jobs",
    params(
        ("status" = Option<String>, Query, description = "active or expired"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("refresh" = Option<bool>, Query, description = "Refetch from the backend first")
    ),
    responses(
        (status = 200, description = "Job postings with expiry flags", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let now = time::now();
    let list = state
        .hiring_service
        .list(query.status, query.department.as_deref(), query.refresh, now)
        .await?;
    Ok(Json(JobListResponse::new(list, now)))
}

#[utoipa::path(
    post,
    path = "/api/hiring/jobs",
    request_body = JobPostingRequest,
    responses(
        (status = 201, description = "Job posting created", body = Json<JobPostingResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<JobPostingRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let posting = state.hiring_service.create(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobPostingResponse::new(posting, time::now())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/hiring/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Job posting found", body = Json<JobPostingResponse>),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let posting = state.hiring_service.get(&id).await?;
    Ok(Json(JobPostingResponse::new(posting, time::now())))
}

#[utoipa::path(
    put,
    path = "/api/hiring/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job posting ID")
    ),
    request_body = JobPostingRequest,
    responses(
        (status = 200, description = "Job posting updated", body = Json<JobPostingResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<JobPostingRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let posting = state.hiring_service.update(&id, payload.into()).await?;
    Ok(Json(JobPostingResponse::new(posting, time::now())))
}

#[utoipa::path(
    delete,
    path = "/api/hiring/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job posting ID")
    ),
    responses(
        (status = 204, description = "Job posting deleted"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.hiring_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/hiring/wizard",
    responses(
        (status = 201, description = "Wizard session opened", body = Json<WizardResponse>)
    )
)]
#[axum::debug_handler]
pub async fn start_wizard(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.start();
    Ok((StatusCode::CREATED, Json(WizardResponse::from(wizard))))
}

#[utoipa::path(
    get,
    path = "/api/hiring/wizard/{id}",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    responses(
        (status = 200, description = "Wizard state", body = Json<WizardResponse>),
        (status = 404, description = "Session not found")
    )
)]
#[axum::debug_handler]
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.get(id)?;
    Ok(Json(WizardResponse::from(wizard)))
}

#[utoipa::path(
    put,
    path = "/api/hiring/wizard/{id}/basic",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    request_body = BasicInfo,
    responses(
        (status = 200, description = "Step saved", body = Json<WizardResponse>),
        (status = 400, description = "Step is invalid")
    )
)]
#[axum::debug_handler]
pub async fn save_basic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BasicInfo>,
) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.save_basic(id, payload)?;
    Ok(Json(WizardResponse::from(wizard)))
}

#[utoipa::path(
    put,
    path = "/api/hiring/wizard/{id}/position",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    request_body = PositionInfo,
    responses(
        (status = 200, description = "Step saved", body = Json<WizardResponse>),
        (status = 400, description = "Step is invalid"),
        (status = 409, description = "Earlier step not completed")
    )
)]
#[axum::debug_handler]
pub async fn save_position(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PositionInfo>,
) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.save_position(id, payload)?;
    Ok(Json(WizardResponse::from(wizard)))
}

#[utoipa::path(
    put,
    path = "/api/hiring/wizard/{id}/compensation",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    request_body = Compensation,
    responses(
        (status = 200, description = "Step saved", body = Json<WizardResponse>),
        (status = 400, description = "Step is invalid"),
        (status = 409, description = "Earlier step not completed")
    )
)]
#[axum::debug_handler]
pub async fn save_compensation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Compensation>,
) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.save_compensation(id, payload)?;
    Ok(Json(WizardResponse::from(wizard)))
}

#[utoipa::path(
    post,
    path = "/api/hiring/wizard/{id}/back",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    responses(
        (status = 200, description = "Moved one step back", body = Json<WizardResponse>),
        (status = 400, description = "Already at the first step")
    )
)]
#[axum::debug_handler]
pub async fn wizard_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let wizard = state.wizard_service.back(id)?;
    Ok(Json(WizardResponse::from(wizard)))
}

#[utoipa::path(
    post,
    path = "/api/hiring/wizard/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Wizard session ID")
    ),
    responses(
        (status = 201, description = "Hire submitted, session closed", body = Json<WizardSubmitResponse>),
        (status = 409, description = "Steps incomplete or already submitting")
    )
)]
#[axum::debug_handler]
pub async fn submit_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let employee = state.wizard_service.submit(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(WizardSubmitResponse {
            submitted: true,
            employee,
        }),
    ))
}

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::directory_dto::{
        EmployeeListQuery, EmployeeListResponse, EmployeeResponse, FarmerResponse,
        TeamListResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/employees/sales",
    params(
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("search" = Option<String>, Query, description = "Match name, email or employee code"),
        ("refresh" = Option<bool>, Query, description = "Refetch from the backend first")
    ),
    responses(
        (status = 200, description = "Sales employees", body = Json<EmployeeListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_sales_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<impl IntoResponse> {
    let items: Vec<EmployeeResponse> = state
        .directory_service
        .sales_employees(
            query.department.as_deref(),
            query.search.as_deref(),
            query.refresh,
        )
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(EmployeeListResponse {
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/farmers/{id}",
    params(
        ("id" = String, Path, description = "Farmer ID")
    ),
    responses(
        (status = 200, description = "Farmer with payment summary", body = Json<FarmerResponse>),
        (status = 404, description = "Farmer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let farmer = state.directory_service.farmer(&id).await?;
    Ok(Json(FarmerResponse::from(farmer)))
}

#[utoipa::path(
    get,
    path = "/api/teams/employee/{id}",
    params(
        ("id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Teams the employee belongs to", body = Json<TeamListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn teams_for_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let teams = state.directory_service.teams_for_employee(&id).await?;
    Ok(Json(TeamListResponse {
        items: teams.into_iter().map(Into::into).collect(),
    }))
}

pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::time::Duration;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono_tz::Tz;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    backend_client::BackendClient, calendar_service::CalendarService,
    directory_service::DirectoryService, hire_wizard::WizardService,
    hiring_service::HiringService, meeting_service::MeetingService,
    meeting_status::StatusResolver, reminder_service::ReminderService,
};

#[derive(Clone)]
pub struct AppState {
    pub backend_url: String,
    pub timezone: Tz,
    pub dashboard_rps: u32,
    pub calendar_service: CalendarService,
    pub meeting_service: MeetingService,
    pub hiring_service: HiringService,
    pub wizard_service: WizardService,
    pub directory_service: DirectoryService,
    pub reminders: ReminderService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let client = BackendClient::new(config)?;
        let resolver = StatusResolver::new(config.timezone, config.starting_soon_minutes);
        let reminders = ReminderService::new(config.reminder_lead_minutes);

        let calendar_service = CalendarService::new(client.clone(), config.calendar_layout);
        let meeting_service = MeetingService::new(client.clone(), resolver, reminders.clone());
        let hiring_service = HiringService::new(client.clone());
        let wizard_service = WizardService::new(
            client.clone(),
            Duration::from_secs(config.wizard_idle_minutes * 60),
        );
        let directory_service = DirectoryService::new(client.clone());

        Ok(Self {
            backend_url: client.base_url().to_string(),
            timezone: config.timezone,
            dashboard_rps: config.dashboard_rps,
            calendar_service,
            meeting_service,
            hiring_service,
            wizard_service,
            directory_service,
            reminders,
        })
    }
}

/// Every gateway route, rate limited under `/api`.
pub fn build_router(state: AppState) -> Router {
    let base_routes = Router::new().route("/health", get(routes::health::health));

    let dashboard_api = Router::new()
        .route("/api/calendar/events", get(routes::calendar::list_entries))
        .route("/api/calendar/events/:id", delete(routes::calendar::delete_event))
        .route("/api/calendar/refresh", post(routes::calendar::refresh))
        .route(
            "/api/calendar/departments",
            get(routes::calendar::list_departments),
        )
        .route(
            "/api/calendar/form",
            get(routes::calendar::get_form).post(routes::calendar::submit_form),
        )
        .route(
            "/api/meetings",
            get(routes::meetings::list_meetings).post(routes::meetings::create_meeting),
        )
        .route(
            "/api/meetings/conflicts",
            get(routes::meetings::list_conflicts),
        )
        .route(
            "/api/meetings/:id",
            put(routes::meetings::update_meeting).delete(routes::meetings::delete_meeting),
        )
        .route(
            "/api/meetings/:id/cancel",
            post(routes::meetings::cancel_meeting),
        )
        .route(
            "/api/hiring/jobs",
            get(routes::hiring::list_jobs).post(routes::hiring::create_job),
        )
        .route(
            "/api/hiring/jobs/:id",
            get(routes::hiring::get_job)
                .put(routes::hiring::update_job)
                .delete(routes::hiring::delete_job),
        )
        .route("/api/hiring/wizard", post(routes::hiring::start_wizard))
        .route("/api/hiring/wizard/:id", get(routes::hiring::get_wizard))
        .route(
            "/api/hiring/wizard/:id/basic",
            put(routes::hiring::save_basic),
        )
        .route(
            "/api/hiring/wizard/:id/position",
            put(routes::hiring::save_position),
        )
        .route(
            "/api/hiring/wizard/:id/compensation",
            put(routes::hiring::save_compensation),
        )
        .route(
            "/api/hiring/wizard/:id/back",
            post(routes::hiring::wizard_back),
        )
        .route(
            "/api/hiring/wizard/:id/submit",
            post(routes::hiring::submit_wizard),
        )
        .route(
            "/api/employees/sales",
            get(routes::directory::list_sales_employees),
        )
        .route("/api/farmers/:id", get(routes::directory::get_farmer))
        .route(
            "/api/teams/employee/:id",
            get(routes::directory::teams_for_employee),
        )
        .route("/api/notifications/poll", get(routes::notifications::poll))
        .route(
            "/api/notifications/pending",
            get(routes::notifications::pending),
        )
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(state.dashboard_rps),
            middleware::rate_limit::rps_middleware,
        ));

    base_routes.merge(dashboard_api).with_state(state)
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use ops_dashboard::{build_router, config::Config, AppState};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// In-memory stand-in for the HR backend. Collections answer in the envelope
/// shapes the real service uses, and every request is recorded as `"METHOD /path"`.
#[derive(Default)]
pub struct FakeBackend {
    pub events: Mutex<Vec<JsonValue>>,
    pub departments: Mutex<Vec<JsonValue>>,
    pub hr_meetings: Mutex<Vec<JsonValue>>,
    pub team_meetings: Mutex<Vec<JsonValue>>,
    pub jobs: Mutex<Vec<JsonValue>>,
    pub onboarded: Mutex<Vec<JsonValue>>,
    pub employees: Mutex<Vec<JsonValue>>,
    pub farmers: Mutex<Vec<JsonValue>>,
    pub teams: Mutex<Vec<JsonValue>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_reads: Mutex<bool>,
    /// Holds every event create for this long before answering.
    pub write_delay: Mutex<Option<Duration>>,
    next_id: Mutex<u32>,
}

impl FakeBackend {
    pub fn calls_to(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail_reads.lock().unwrap() = failing;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    fn assign_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{}-{}", prefix, *next)
    }

    fn failing(&self) -> bool {
        *self.fail_reads.lock().unwrap()
    }
}

type Backend = Arc<FakeBackend>;

fn with_id(mut body: JsonValue, id: &str) -> JsonValue {
    if let Some(map) = body.as_object_mut() {
        map.insert("_id".to_string(), json!(id));
    }
    body
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": format!("{} not found", what) })),
    )
        .into_response()
}

fn replace(list: &Mutex<Vec<JsonValue>>, id: &str, body: JsonValue) -> Option<JsonValue> {
    let mut list = list.lock().unwrap();
    let slot = list.iter_mut().find(|item| item["_id"] == id)?;
    *slot = with_id(body, id);
    Some(slot.clone())
}

fn remove(list: &Mutex<Vec<JsonValue>>, id: &str) -> bool {
    let mut list = list.lock().unwrap();
    let before = list.len();
    list.retain(|item| item["_id"] != id);
    list.len() != before
}

async fn record_call(State(backend): State<Backend>, req: Request, next: Next) -> Response {
    backend
        .calls
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

async fn list_events(State(backend): State<Backend>) -> Response {
    if backend.failing() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database unavailable" })),
        )
            .into_response();
    }
    let events = backend.events.lock().unwrap().clone();
    Json(json!({ "success": true, "data": events })).into_response()
}

async fn create_event(State(backend): State<Backend>, Json(body): Json<JsonValue>) -> Response {
    let delay = *backend.write_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if body["title"] == "Reject me" {
        return Json(json!({ "success": false, "message": "Duplicate holiday" })).into_response();
    }
    let record = with_id(body, &backend.assign_id("evt"));
    backend.events.lock().unwrap().push(record.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": record }))).into_response()
}

async fn update_event(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> Response {
    match replace(&backend.events, &id, body) {
        Some(record) => Json(json!({ "success": true, "data": record })).into_response(),
        None => not_found("Event"),
    }
}

async fn delete_event(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    if remove(&backend.events, &id) {
        Json(json!({ "success": true })).into_response()
    } else {
        not_found("Event")
    }
}

async fn list_departments(State(backend): State<Backend>) -> Response {
    Json(JsonValue::Array(backend.departments.lock().unwrap().clone())).into_response()
}

fn meetings_of(backend: &FakeBackend, team_leader: bool) -> &Mutex<Vec<JsonValue>> {
    if team_leader {
        &backend.team_meetings
    } else {
        &backend.hr_meetings
    }
}

async fn list_meetings(backend: Backend, team_leader: bool) -> Response {
    let meetings = meetings_of(&backend, team_leader).lock().unwrap().clone();
    Json(json!({ "success": true, "meetings": meetings })).into_response()
}

async fn create_meeting(backend: Backend, team_leader: bool, body: JsonValue) -> Response {
    let record = with_id(body, &backend.assign_id("mtg"));
    meetings_of(&backend, team_leader)
        .lock()
        .unwrap()
        .push(record.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": record }))).into_response()
}

async fn update_meeting(backend: Backend, team_leader: bool, id: String, body: JsonValue) -> Response {
    match replace(meetings_of(&backend, team_leader), &id, body) {
        Some(record) => Json(json!({ "success": true, "data": record })).into_response(),
        None => not_found("Meeting"),
    }
}

async fn delete_meeting(backend: Backend, team_leader: bool, id: String) -> Response {
    if remove(meetings_of(&backend, team_leader), &id) {
        Json(json!({ "success": true })).into_response()
    } else {
        not_found("Meeting")
    }
}

async fn list_jobs(State(backend): State<Backend>) -> Response {
    Json(JsonValue::Array(backend.jobs.lock().unwrap().clone())).into_response()
}

async fn create_job(State(backend): State<Backend>, Json(body): Json<JsonValue>) -> Response {
    let record = with_id(body, &backend.assign_id("job"));
    backend.jobs.lock().unwrap().push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_job(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    let jobs = backend.jobs.lock().unwrap();
    match jobs.iter().find(|job| job["_id"] == id.as_str()) {
        Some(job) => Json(job.clone()).into_response(),
        None => not_found("Job"),
    }
}

async fn update_job(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> Response {
    match replace(&backend.jobs, &id, body) {
        Some(record) => Json(record).into_response(),
        None => not_found("Job"),
    }
}

async fn delete_job(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    if remove(&backend.jobs, &id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("Job")
    }
}

async fn onboard(State(backend): State<Backend>, Json(body): Json<JsonValue>) -> Response {
    backend.onboarded.lock().unwrap().push(body.clone());
    let employee = with_id(
        json!({ "name": body["fullName"], "email": body["email"] }),
        &backend.assign_id("emp"),
    );
    (StatusCode::CREATED, Json(json!({ "success": true, "data": employee }))).into_response()
}

async fn sales_employees(State(backend): State<Backend>) -> Response {
    let employees = backend.employees.lock().unwrap().clone();
    Json(json!({ "success": true, "data": employees })).into_response()
}

async fn get_farmer(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    let farmers = backend.farmers.lock().unwrap();
    match farmers.iter().find(|farmer| farmer["_id"] == id.as_str()) {
        Some(farmer) => Json(json!({ "success": true, "data": farmer })).into_response(),
        None => not_found("Farmer"),
    }
}

async fn teams_for_employee(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    let teams: Vec<JsonValue> = backend
        .teams
        .lock()
        .unwrap()
        .iter()
        .filter(|team| {
            team["members"]
                .as_array()
                .is_some_and(|members| members.iter().any(|m| m["_id"] == id.as_str()))
        })
        .cloned()
        .collect();
    // The backend answers with a bare object when the employee is in one team.
    match teams.len() {
        0 => Json(json!({ "success": true, "data": null })).into_response(),
        1 => Json(json!({ "success": true, "data": teams[0] })).into_response(),
        _ => Json(json!({ "success": true, "data": teams })).into_response(),
    }
}

fn backend_router(backend: Backend) -> Router {
    Router::new()
        .route(
            "/api/hr/attendance-calendar/events",
            get(list_events).post(create_event),
        )
        .route(
            "/api/hr/attendance-calendar/events/:id",
            put(update_event).delete(delete_event),
        )
        .route("/api/hr/attendance-calendar/departments", get(list_departments))
        .route(
            "/api/hr/meetings",
            get(|State(b): State<Backend>| list_meetings(b, false)).post(
                |State(b): State<Backend>, Json(body): Json<JsonValue>| create_meeting(b, false, body),
            ),
        )
        .route(
            "/api/hr/meetings/:id",
            put(
                |State(b): State<Backend>, Path(id): Path<String>, Json(body): Json<JsonValue>| {
                    update_meeting(b, false, id, body)
                },
            )
            .delete(|State(b): State<Backend>, Path(id): Path<String>| delete_meeting(b, false, id)),
        )
        .route(
            "/api/team-leader/meetings",
            get(|State(b): State<Backend>| list_meetings(b, true)).post(
                |State(b): State<Backend>, Json(body): Json<JsonValue>| create_meeting(b, true, body),
            ),
        )
        .route(
            "/api/team-leader/meetings/:id",
            put(
                |State(b): State<Backend>, Path(id): Path<String>, Json(body): Json<JsonValue>| {
                    update_meeting(b, true, id, body)
                },
            )
            .delete(|State(b): State<Backend>, Path(id): Path<String>| delete_meeting(b, true, id)),
        )
        .route("/api/hr/hiring/jobs", get(list_jobs).post(create_job))
        .route(
            "/api/hr/hiring/jobs/:id",
            get(get_job).put(update_job).delete(delete_job),
        )
        .route("/api/hr/hiring/onboard", post(onboard))
        .route("/api/hr/sales-employees/fetch-data", get(sales_employees))
        .route("/api/project-manager/farmers/:id", get(get_farmer))
        .route("/api/tl/teams/employee/:id", get(teams_for_employee))
        .layer(middleware::from_fn_with_state(backend.clone(), record_call))
        .with_state(backend)
}

/// Serves `backend` on an ephemeral port and builds the gateway against it.
pub async fn spawn_app(backend: Backend) -> Router {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    let router = backend_router(backend);
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    let config = Config::for_backend(&format!("http://{}", addr)).expect("test config");
    let state = AppState::new(&config).expect("app state");
    build_router(state)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

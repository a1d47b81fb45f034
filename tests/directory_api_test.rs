mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value as JsonValue};

use common::{send, spawn_app, FakeBackend};

fn employee(id: &str, name: &str, department: Option<&str>, role: Option<&str>) -> JsonValue {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{}@example.com", id),
        "department": department,
        "role": role,
        "employeeCode": format!("EMP-{}", id.to_uppercase())
    })
}

fn ids(body: &JsonValue) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn sales_employees_filter_by_department_and_search() {
    let backend = FakeBackend::default();
    backend.employees.lock().unwrap().extend([
        employee("e1", "Alisher Karimov", Some("North"), None),
        employee("e2", "Dilnoza Saidova", None, Some("north")),
        employee("e3", "Farrukh Aliev", Some("South"), None),
    ]);
    let backend = Arc::new(backend);
    let app = spawn_app(backend.clone()).await;

    let (status, all) = send(&app, "GET", "/api/employees/sales", None).await;
    assert_eq!(status, StatusCode::OK, "{}", all);
    assert_eq!(all["total"], 3);
    assert_eq!(all["items"][1]["department"], "north");
    assert_eq!(all["items"][0]["emp_code"], "EMP-E1");

    let (_, north) = send(&app, "GET", "/api/employees/sales?department=North", None).await;
    assert_eq!(ids(&north), vec!["e1", "e2"]);

    let (_, search) = send(&app, "GET", "/api/employees/sales?search=ALI", None).await;
    assert_eq!(ids(&search), vec!["e1", "e3"]);

    let (_, by_code) = send(&app, "GET", "/api/employees/sales?search=emp-e2", None).await;
    assert_eq!(ids(&by_code), vec!["e2"]);

    assert_eq!(backend.calls_to("GET /api/hr/sales-employees/fetch-data"), 1);
}

#[tokio::test]
async fn farmer_comes_with_payment_summary() {
    let backend = FakeBackend::default();
    backend.farmers.lock().unwrap().push(json!({
        "_id": "f1",
        "name": "Rustam Nazarov",
        "village": "Vahdat",
        "payments": [
            { "_id": "p1", "amount": 100, "date": "2025-01-05", "status": "paid" },
            { "_id": "p2", "amount": 250, "date": "2025-02-01", "status": "paid" },
            { "_id": "p3", "amount": 75, "date": "2025-03-01", "status": "pending" }
        ]
    }));
    let app = spawn_app(Arc::new(backend)).await;

    let (status, body) = send(&app, "GET", "/api/farmers/f1", None).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["name"], "Rustam Nazarov");
    assert_eq!(body["payments"].as_array().unwrap().len(), 3);
    assert_eq!(body["summary"]["total_paid"], "350");
    assert_eq!(body["summary"]["total_pending"], "75");
    assert_eq!(body["summary"]["payment_count"], 3);
    assert_eq!(body["summary"]["last_payment_date"], "2025-02-01");
}

#[tokio::test]
async fn unknown_farmer_is_not_found() {
    let app = spawn_app(Arc::new(FakeBackend::default())).await;

    let (status, body) = send(&app, "GET", "/api/farmers/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Farmer not found");
}

#[tokio::test]
async fn teams_for_employee_accept_single_or_many() {
    let backend = FakeBackend::default();
    let member = employee("e1", "Alisher Karimov", Some("North"), None);
    let other = employee("e2", "Dilnoza Saidova", Some("North"), None);
    backend.teams.lock().unwrap().extend([
        json!({
            "_id": "t1",
            "teamName": "North Field",
            "teamLeader": employee("tl1", "Bahrom Usmonov", Some("North"), Some("team_leader")),
            "members": [member.clone(), other]
        }),
        json!({ "_id": "t2", "name": "Harvest Crew", "members": [member] }),
    ]);
    let app = spawn_app(Arc::new(backend)).await;

    let (status, both) = send(&app, "GET", "/api/teams/employee/e1", None).await;
    assert_eq!(status, StatusCode::OK, "{}", both);
    assert_eq!(ids(&both), vec!["t1", "t2"]);
    assert_eq!(both["items"][0]["name"], "North Field");
    assert_eq!(both["items"][0]["leader"]["name"], "Bahrom Usmonov");

    let (_, single) = send(&app, "GET", "/api/teams/employee/e2", None).await;
    assert_eq!(ids(&single), vec!["t1"]);

    let (status, none) = send(&app, "GET", "/api/teams/employee/nobody", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none["items"], json!([]));
}

#[tokio::test]
async fn health_reports_backend_and_timezone() {
    let app = spawn_app(Arc::new(FakeBackend::default())).await;

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timezone"], "UTC");
    assert!(body["backend"].as_str().unwrap().starts_with("http://127.0.0.1:"));
}

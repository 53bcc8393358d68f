mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn submit_request(app: &TestApp, employee: i32) -> i64 {
    let (status, body) = app
        .post("/requests", &app.admin(), json!({ "employeeId": employee, "type": "Equipment" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

async fn request_status(app: &TestApp, id: i64) -> Value {
    let (_, body) = app.get(&format!("/requests/{id}"), &app.admin()).await;
    body["data"]["status"].clone()
}

async fn create_workflow(app: &TestApp, body: Value) -> i64 {
    let (status, created) = app.post("/workflows", &app.admin(), body).await;
    assert_eq!(status, StatusCode::CREATED);
    created["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn approving_the_workflow_approves_the_request() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let request = submit_request(&app, employee).await;
    let workflow = app.workflows_of_type("Request Approval").await[0]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Approved" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Approved");
    assert_eq!(request_status(&app, request).await, "Approved");

    app.put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Rejected" }))
        .await;
    assert_eq!(request_status(&app, request).await, "Rejected");

    // No extra workflow rows come out of a status change.
    assert_eq!(app.workflows_of_type("Request Approval").await.len(), 1);
}

#[tokio::test]
async fn legacy_narrative_workflow_still_finds_its_request() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let request = submit_request(&app, employee).await;
    let workflow = create_workflow(
        &app,
        json!({
            "employeeId": employee,
            "type": "RequestApproval",
            "details": format!("Review Equipment request #{request} from Employee ID EMP001.")
        }),
    )
    .await;

    let (status, _) = app
        .put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Rejected" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request_status(&app, request).await, "Rejected");
}

#[tokio::test]
async fn explicit_request_id_wins_even_as_a_string() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let first = submit_request(&app, employee).await;
    let second = submit_request(&app, employee).await;
    let workflow = create_workflow(
        &app,
        json!({ "employeeId": employee, "type": "Request Approval", "details": { "requestId": first } }),
    )
    .await;

    let (status, _) = app
        .put(
            &format!("/workflows/{workflow}/status"),
            &app.admin(),
            json!({ "status": "Approved", "requestId": second.to_string() }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request_status(&app, first).await, "Pending");
    assert_eq!(request_status(&app, second).await, "Approved");
}

#[tokio::test]
async fn statuses_without_a_request_counterpart_leave_the_request_alone() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let request = submit_request(&app, employee).await;
    let workflow = app.workflows_of_type("Request Approval").await[0]["id"].as_i64().unwrap();

    for status in ["For Reviewing", "Completed"] {
        let (code, body) = app
            .put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": status }))
            .await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["data"]["status"], status);
        assert_eq!(request_status(&app, request).await, "Pending");
    }
}

#[tokio::test]
async fn unknown_status_lists_the_allowed_values() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    submit_request(&app, employee).await;
    let workflow = app.workflows_of_type("Request Approval").await[0]["id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Done" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Approved"));
}

#[tokio::test]
async fn missing_request_does_not_fail_the_workflow_update() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let workflow = create_workflow(
        &app,
        json!({ "employeeId": employee, "type": "Request Approval", "details": "requestId: 999" }),
    )
    .await;

    let (status, body) = app
        .put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Approved" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Approved");
}

#[tokio::test]
async fn other_workflow_types_do_not_touch_requests() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", None).await;
    let request = submit_request(&app, employee).await;
    let workflow = create_workflow(
        &app,
        json!({ "employeeId": employee, "type": "Transfer", "details": { "requestId": request } }),
    )
    .await;

    app.put(&format!("/workflows/{workflow}/status"), &app.admin(), json!({ "status": "Approved" }))
        .await;
    assert_eq!(request_status(&app, request).await, "Pending");
}

#[tokio::test]
async fn status_changes_require_admin() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP001", Some(20)).await;
    submit_request(&app, employee).await;
    let workflow = app.workflows_of_type("Request Approval").await[0]["id"].as_i64().unwrap();

    let (status, _) = app
        .put(
            &format!("/workflows/{workflow}/status"),
            &app.token(20, "User"),
            json!({ "status": "Approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_workflow_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .put("/workflows/42/status", &app.admin(), json!({ "status": "Approved" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Workflow not found");
}

#[tokio::test]
async fn onboarding_endpoint_opens_a_pending_row() {
    let app = TestApp::new();
    let employee = app.seed_employee("EMP009", None).await;

    let (status, body) = app
        .post("/workflows/onboarding", &app.admin(), json!({ "employeeId": employee }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "Onboarding");
    assert_eq!(body["data"]["status"], "Pending");

    let (_, listed) = app.get(&format!("/workflows/employee/{employee}"), &app.admin()).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .post("/workflows/onboarding", &app.admin(), json!({ "employeeId": 777 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

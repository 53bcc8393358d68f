#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use hr_backend::config::Config;
use hr_backend::db::memory::MemoryRepository;
use hr_backend::db::models::department::NewDepartment;
use hr_backend::db::models::employee::{EmployeeDraft, EmployeeStatus};
use hr_backend::db::repository::{DepartmentStore, EmployeeStore};
use hr_backend::middleware::auth::Claims;
use hr_backend::AppState;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_ACCOUNT: i32 = 1;

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let router = hr_backend::app(AppState::new(repo.clone(), config.clone()));
        Self { router, repo, config }
    }

    pub fn token(&self, account_id: i32, role: &str) -> String {
        let claims = Claims {
            sub: account_id.to_string(),
            role: role.to_string(),
            exp: chrono::Utc::now().timestamp() as usize + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn admin(&self) -> String {
        self.token(ADMIN_ACCOUNT, "Admin")
    }

    /// Sends one request and returns the status with the decoded JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Stores an employee directly, bypassing the onboarding side effect.
    pub async fn seed_employee(&self, code: &str, account_id: Option<i32>) -> i32 {
        self.repo
            .insert_employee(&EmployeeDraft {
                employee_id: code.to_string(),
                account_id,
                department_id: None,
                position: "Developer".into(),
                hire_date: None,
                status: EmployeeStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn seed_department(&self, name: &str) -> i32 {
        self.repo
            .insert_department(&NewDepartment { name: name.to_string(), description: None })
            .await
            .unwrap()
            .id
    }

    /// Workflows of one type in creation order.
    pub async fn workflows_of_type(&self, workflow_type: &str) -> Vec<Value> {
        let (status, body) = self.get("/workflows", &self.admin()).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|w| w["type"] == workflow_type)
            .cloned()
            .collect()
    }
}

/// Workflow details as JSON, whether they came back structured or as text.
pub fn details_json(workflow: &Value) -> Value {
    match &workflow["details"] {
        Value::String(text) => serde_json::from_str(text).unwrap_or(Value::String(text.clone())),
        other => other.clone(),
    }
}

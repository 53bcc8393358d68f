use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    pub enum WorkflowType {
        Transfer => "Transfer",
        DepartmentTransfer => "Department Transfer",
        RequestApproval => "Request Approval",
        /// Legacy spelling still present in older rows.
        RequestApprovalLegacy => "RequestApproval",
        RequestEdit => "Request Edit",
        Onboarding => "Onboarding",
        Offboarding => "Offboarding",
    }
}

impl WorkflowType {
    /// Workflows whose status is mirrored onto the originating request.
    pub fn is_request_approval(&self) -> bool {
        matches!(self, WorkflowType::RequestApproval | WorkflowType::RequestApprovalLegacy)
    }
}

text_enum! {
    #[derive(Default)]
    pub enum WorkflowStatus {
        #[default]
        Pending => "Pending",
        ForReviewing => "For Reviewing",
        Approved => "Approved",
        Rejected => "Rejected",
        Completed => "Completed",
    }
}

/// Free-form workflow payload.
///
/// Producers either hand over a JSON object or a narrative string. Storage
/// keeps a single TEXT column, so anything read back from a store arrives as
/// `Text` and is only interpreted when a back-reference is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowDetails {
    Structured(Map<String, Value>),
    Text(String),
}

impl WorkflowDetails {
    pub fn structured(value: Value) -> Self {
        match value {
            Value::Object(map) => WorkflowDetails::Structured(map),
            Value::String(text) => WorkflowDetails::Text(text),
            other => WorkflowDetails::Text(other.to_string()),
        }
    }

    /// Text written to the `details` column.
    pub fn to_storage_text(&self) -> String {
        match self {
            WorkflowDetails::Structured(map) => Value::Object(map.clone()).to_string(),
            WorkflowDetails::Text(text) => text.clone(),
        }
    }
}

impl Default for WorkflowDetails {
    fn default() -> Self {
        WorkflowDetails::Text(String::new())
    }
}

impl From<String> for WorkflowDetails {
    fn from(text: String) -> Self {
        WorkflowDetails::Text(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: i32,
    pub employee_id: i32,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub workflow_type: WorkflowType,
    #[sqlx(try_from = "String")]
    #[schema(value_type = Object)]
    pub details: WorkflowDetails,
    /// Explicit back-reference to the originating request.
    pub request_id: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: WorkflowStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub employee_id: i32,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Option<WorkflowDetails>,
    pub request_id: Option<i32>,
    pub status: Option<WorkflowStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingWorkflow {
    pub employee_id: i32,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Option<WorkflowDetails>,
}

/// Body of `PUT /workflows/{id}/status`.
///
/// `status` stays a plain string so an unknown value can be reported with
/// the allowed set; `requestId` may arrive as a number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowStatus {
    pub status: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub request_id: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct WorkflowDraft {
    pub employee_id: i32,
    pub workflow_type: WorkflowType,
    pub details: WorkflowDetails,
    pub request_id: Option<i32>,
    pub status: WorkflowStatus,
}

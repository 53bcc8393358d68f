use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::department::DepartmentSummary;

text_enum! {
    #[derive(Default)]
    pub enum EmployeeStatus {
        #[default]
        Active => "Active",
        Inactive => "Inactive",
        OnLeave => "On Leave",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i32,
    /// Human-readable code such as `EMP007`.
    pub employee_id: String,
    /// Owning account in the identity provider.
    pub account_id: Option<i32>,
    pub department_id: Option<i32>,
    pub position: String,
    pub hire_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: EmployeeStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    /// Generated when absent or blank.
    pub employee_id: Option<String>,
    pub account_id: Option<i32>,
    pub department_id: Option<i32>,
    pub position: String,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

/// Fully resolved employee row ready for insertion.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub employee_id: String,
    pub account_id: Option<i32>,
    pub department_id: Option<i32>,
    pub position: String,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
}

/// Partial update. The human-readable code is immutable once assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub account_id: Option<i32>,
    pub department_id: Option<i32>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

impl UpdateEmployee {
    pub fn is_empty(&self) -> bool {
        self.account_id.is_none()
            && self.department_id.is_none()
            && self.position.is_none()
            && self.hire_date.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferEmployee {
    pub department_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithDetails {
    #[serde(flatten)]
    pub employee: Employee,
    pub department: Option<DepartmentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextEmployeeId {
    pub employee_id: String,
}

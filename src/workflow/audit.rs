//! Workflow rows written as the audit trail of employee and request actions.
//! Every triggering call appends exactly one row; nothing is merged.

use serde_json::json;

use crate::db::models::department::Department;
use crate::db::models::employee::Employee;
use crate::db::models::requests::Request;
use crate::db::models::workflow::{WorkflowDetails, WorkflowDraft, WorkflowStatus, WorkflowType};

pub fn onboarding(employee: &Employee) -> WorkflowDraft {
    WorkflowDraft {
        employee_id: employee.id,
        workflow_type: WorkflowType::Onboarding,
        details: WorkflowDetails::structured(json!({
            "task": "Setup workstation",
            "employeeId": employee.employee_id,
            "position": employee.position,
        })),
        request_id: None,
        status: WorkflowStatus::Pending,
    }
}

pub fn department_transfer(
    employee: &Employee,
    from: Option<&Department>,
    to: Option<&Department>,
) -> WorkflowDraft {
    let name = |d: Option<&Department>| d.map_or("Unknown", |d| d.name.as_str()).to_string();
    WorkflowDraft {
        employee_id: employee.id,
        workflow_type: WorkflowType::DepartmentTransfer,
        details: WorkflowDetails::Text(format!(
            "Employee transferred from {} to {}.",
            name(from),
            name(to)
        )),
        request_id: None,
        status: WorkflowStatus::Pending,
    }
}

/// Approval row for a new request (`updated == false`) or an edit.
///
/// `requester_code` is the owner's human-readable code when known, falling
/// back to the numeric id.
pub fn request_approval(request: &Request, requester_code: &str, updated: bool) -> WorkflowDraft {
    let verb = if updated { "Review updated" } else { "Review" };
    let message = format!(
        "{verb} {} request #{} from Employee ID {requester_code}.",
        request.request_type, request.id
    );
    WorkflowDraft {
        employee_id: request.employee_id,
        workflow_type: WorkflowType::RequestApproval,
        details: WorkflowDetails::structured(json!({
            "requestId": request.id,
            "requestType": request.request_type,
            "requesterId": request.employee_id,
            "message": message,
        })),
        request_id: Some(request.id),
        status: WorkflowStatus::Pending,
    }
}

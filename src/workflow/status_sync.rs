use tracing::{debug, info, warn};

use crate::db::models::requests::RequestStatus;
use crate::db::models::workflow::{Workflow, WorkflowStatus};
use crate::db::repository::{Repository, StoreError, StoreResult};
use crate::workflow::backref::{self, BackRefSource};

/// What happened to the originating request after a workflow status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSync {
    Propagated {
        request_id: i32,
        status: RequestStatus,
        source: BackRefSource,
    },
    /// The workflow type does not mirror onto requests.
    NotApplicable,
    /// The new workflow status has no request counterpart.
    UnmappedStatus,
    NoBackReference,
    RequestMissing { request_id: i32 },
    Failed { request_id: i32, reason: String },
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub workflow: Workflow,
    pub sync: StatusSync,
}

/// Request status mirrored from a workflow status, if any.
pub fn request_status_for(status: WorkflowStatus) -> Option<RequestStatus> {
    match status {
        WorkflowStatus::Approved => Some(RequestStatus::Approved),
        WorkflowStatus::Rejected => Some(RequestStatus::Rejected),
        WorkflowStatus::Pending => Some(RequestStatus::Pending),
        WorkflowStatus::ForReviewing | WorkflowStatus::Completed => None,
    }
}

/// Persists a workflow status and, for request-approval workflows, mirrors
/// it onto the referenced request.
///
/// Only the workflow write can fail this call. Everything after it is best
/// effort: a missing back-reference, a missing request or a store error while
/// updating the request is logged and reported through [`StatusSync`].
pub async fn update_workflow_status(
    repo: &dyn Repository,
    workflow_id: i32,
    status: WorkflowStatus,
    explicit_request_id: Option<i32>,
) -> StoreResult<StatusUpdate> {
    let workflow = repo.set_workflow_status(workflow_id, status).await?;
    info!("Workflow {} status updated to {}", workflow.id, status);

    let sync = propagate(repo, &workflow, status, explicit_request_id).await;
    Ok(StatusUpdate { workflow, sync })
}

async fn propagate(
    repo: &dyn Repository,
    workflow: &Workflow,
    status: WorkflowStatus,
    explicit_request_id: Option<i32>,
) -> StatusSync {
    if !workflow.workflow_type.is_request_approval() {
        return StatusSync::NotApplicable;
    }

    let Some(backref) = backref::resolve(workflow, explicit_request_id) else {
        info!("No requestId could be recovered for workflow {}", workflow.id);
        return StatusSync::NoBackReference;
    };
    debug!(
        "Workflow {} refers to request {} ({:?})",
        workflow.id, backref.request_id, backref.source
    );

    let Some(request_status) = request_status_for(status) else {
        debug!("Workflow status {} does not map onto a request status", status);
        return StatusSync::UnmappedStatus;
    };

    match repo.set_request_status(backref.request_id, request_status).await {
        Ok(request) => {
            info!("Updated request {} status to {}", request.id, request.status);
            StatusSync::Propagated {
                request_id: request.id,
                status: request.status,
                source: backref.source,
            }
        }
        Err(StoreError::NotFound { .. }) => {
            warn!("Could not find request with ID {}", backref.request_id);
            StatusSync::RequestMissing { request_id: backref.request_id }
        }
        Err(e) => {
            warn!("Error updating request {} from workflow {}: {}", backref.request_id, workflow.id, e);
            StatusSync::Failed {
                request_id: backref.request_id,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::db::models::employee::{EmployeeDraft, EmployeeStatus};
    use crate::db::models::requests::{RequestDraft, RequestType};
    use crate::db::models::workflow::{WorkflowDetails, WorkflowDraft, WorkflowType};
    use crate::db::repository::{EmployeeStore, RequestStore, WorkflowStore};
    use serde_json::json;

    async fn seeded() -> (MemoryRepository, i32) {
        let repo = MemoryRepository::new();
        let employee = repo
            .insert_employee(&EmployeeDraft {
                employee_id: "EMP001".into(),
                account_id: None,
                department_id: None,
                position: "Developer".into(),
                hire_date: None,
                status: EmployeeStatus::Active,
            })
            .await
            .unwrap();
        (repo, employee.id)
    }

    async fn request(repo: &MemoryRepository, employee_id: i32) -> i32 {
        repo.insert_request(&RequestDraft {
            employee_id,
            request_type: RequestType::Equipment,
            items: vec![],
        })
        .await
        .unwrap()
        .id
    }

    async fn workflow(
        repo: &MemoryRepository,
        employee_id: i32,
        workflow_type: WorkflowType,
        details: WorkflowDetails,
    ) -> i32 {
        repo.insert_workflow(&WorkflowDraft {
            employee_id,
            workflow_type,
            details,
            request_id: None,
            status: WorkflowStatus::Pending,
        })
        .await
        .unwrap()
        .id
    }

    #[test]
    fn status_mapping() {
        assert_eq!(request_status_for(WorkflowStatus::Approved), Some(RequestStatus::Approved));
        assert_eq!(request_status_for(WorkflowStatus::Rejected), Some(RequestStatus::Rejected));
        assert_eq!(request_status_for(WorkflowStatus::Pending), Some(RequestStatus::Pending));
        assert_eq!(request_status_for(WorkflowStatus::Completed), None);
        assert_eq!(request_status_for(WorkflowStatus::ForReviewing), None);
    }

    #[tokio::test]
    async fn structured_details_drive_approval() {
        let (repo, emp) = seeded().await;
        let req = request(&repo, emp).await;
        let details = WorkflowDetails::structured(json!({"requestId": req, "requestType": "Equipment"}));
        let wf = workflow(&repo, emp, WorkflowType::RequestApproval, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(update.workflow.status, WorkflowStatus::Approved);
        assert!(matches!(update.sync, StatusSync::Propagated { request_id, .. } if request_id == req));
        let stored = repo.find_request(req).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn legacy_type_and_narrative_text() {
        let (repo, emp) = seeded().await;
        let req = request(&repo, emp).await;
        let details = WorkflowDetails::Text(format!("Review Equipment request #{req} from Employee ID EMP001."));
        let wf = workflow(&repo, emp, WorkflowType::RequestApprovalLegacy, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Rejected, None)
            .await
            .unwrap();

        assert!(matches!(
            update.sync,
            StatusSync::Propagated { source: BackRefSource::Narrative, status: RequestStatus::Rejected, .. }
        ));
        assert_eq!(repo.find_request(req).await.unwrap().unwrap().status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn explicit_id_overrides_details() {
        let (repo, emp) = seeded().await;
        let first = request(&repo, emp).await;
        let second = request(&repo, emp).await;
        let details = WorkflowDetails::structured(json!({"requestId": first}));
        let wf = workflow(&repo, emp, WorkflowType::RequestApproval, details).await;

        update_workflow_status(&repo, wf, WorkflowStatus::Approved, Some(second))
            .await
            .unwrap();

        assert_eq!(repo.find_request(first).await.unwrap().unwrap().status, RequestStatus::Pending);
        assert_eq!(repo.find_request(second).await.unwrap().unwrap().status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn missing_back_reference_is_not_an_error() {
        let (repo, emp) = seeded().await;
        let details = WorkflowDetails::structured(json!({"task": "Setup workstation"}));
        let wf = workflow(&repo, emp, WorkflowType::RequestApproval, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(update.sync, StatusSync::NoBackReference);
        assert_eq!(update.workflow.status, WorkflowStatus::Approved);
    }

    #[tokio::test]
    async fn missing_request_keeps_workflow_update() {
        let (repo, emp) = seeded().await;
        let details = WorkflowDetails::Text("requestId: 404".into());
        let wf = workflow(&repo, emp, WorkflowType::RequestApproval, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Rejected, None)
            .await
            .unwrap();

        assert_eq!(update.sync, StatusSync::RequestMissing { request_id: 404 });
        let stored = repo.find_workflow(wf).await.unwrap().unwrap();
        assert_eq!(stored.status, WorkflowStatus::Rejected);
    }

    #[tokio::test]
    async fn unmapped_status_leaves_request_alone() {
        let (repo, emp) = seeded().await;
        let req = request(&repo, emp).await;
        repo.set_request_status(req, RequestStatus::Approved).await.unwrap();
        let details = WorkflowDetails::structured(json!({"requestId": req}));
        let wf = workflow(&repo, emp, WorkflowType::RequestApproval, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Completed, None)
            .await
            .unwrap();

        assert_eq!(update.sync, StatusSync::UnmappedStatus);
        assert_eq!(update.workflow.status, WorkflowStatus::Completed);
        assert_eq!(repo.find_request(req).await.unwrap().unwrap().status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn other_workflow_types_never_propagate() {
        let (repo, emp) = seeded().await;
        let req = request(&repo, emp).await;
        let details = WorkflowDetails::structured(json!({"requestId": req}));
        let wf = workflow(&repo, emp, WorkflowType::Onboarding, details).await;

        let update = update_workflow_status(&repo, wf, WorkflowStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(update.sync, StatusSync::NotApplicable);
        assert_eq!(repo.find_request(req).await.unwrap().unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_workflow_is_not_found() {
        let (repo, _) = seeded().await;
        let err = update_workflow_status(&repo, 99, WorkflowStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "workflow", id: 99 }));
    }
}

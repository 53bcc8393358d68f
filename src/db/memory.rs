use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

use crate::db::models::department::{Department, NewDepartment, UpdateDepartment};
use crate::db::models::employee::{Employee, EmployeeDraft, UpdateEmployee};
use crate::db::models::requests::{ItemDraft, Request, RequestChanges, RequestDraft, RequestItem, RequestStatus};
use crate::db::models::workflow::{Workflow, WorkflowDraft, WorkflowStatus};
use crate::db::repository::{
    DepartmentStore, EmployeeStore, Repository, RequestStore, StoreError, StoreResult, WorkflowStore,
};

#[derive(Debug, Clone)]
struct DepartmentRow {
    id: i32,
    name: String,
    description: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Sequences {
    department: i32,
    employee: i32,
    request: i32,
    request_item: i32,
    workflow: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Tables {
    departments: BTreeMap<i32, DepartmentRow>,
    employees: BTreeMap<i32, Employee>,
    requests: BTreeMap<i32, Request>,
    workflows: BTreeMap<i32, Workflow>,
    seq: Sequences,
}

impl Tables {
    fn department(&self, row: &DepartmentRow) -> Department {
        let employee_count = self
            .employees
            .values()
            .filter(|e| e.department_id == Some(row.id))
            .count() as i64;
        Department {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            employee_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn name_taken(&self, name: &str, except: Option<i32>) -> bool {
        let wanted = name.to_lowercase();
        self.departments
            .values()
            .any(|d| Some(d.id) != except && d.name.to_lowercase() == wanted)
    }

    fn items(&mut self, request_id: i32, drafts: &[ItemDraft]) -> Vec<RequestItem> {
        drafts
            .iter()
            .map(|draft| RequestItem {
                id: next(&mut self.seq.request_item),
                request_id,
                name: draft.name.clone(),
                quantity: draft.quantity,
            })
            .collect()
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Process-local repository mirroring the PostgreSQL schema's constraints
/// (unique names and codes, cascades, SET NULL on department delete).
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepartmentStore for MemoryRepository {
    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let tables = self.tables.read().await;
        Ok(tables.departments.values().map(|row| tables.department(row)).collect())
    }

    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>> {
        let tables = self.tables.read().await;
        Ok(tables.departments.get(&id).map(|row| tables.department(row)))
    }

    async fn insert_department(&self, new: &NewDepartment) -> StoreResult<Department> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&new.name, None) {
            return Err(StoreError::Conflict("Department with this name already exists".into()));
        }
        let id = next(&mut tables.seq.department);
        let stamp = now();
        let row = DepartmentRow {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            created_at: stamp,
            updated_at: stamp,
        };
        let department = tables.department(&row);
        tables.departments.insert(id, row);
        Ok(department)
    }

    async fn update_department(&self, id: i32, changes: &UpdateDepartment) -> StoreResult<Department> {
        let mut tables = self.tables.write().await;
        if !tables.departments.contains_key(&id) {
            return Err(StoreError::not_found("department", id));
        }
        if let Some(name) = &changes.name {
            if tables.name_taken(name, Some(id)) {
                return Err(StoreError::Conflict("Department with this name already exists".into()));
            }
        }
        let row = tables
            .departments
            .get_mut(&id)
            .ok_or(StoreError::not_found("department", id))?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = Some(description.clone());
        }
        row.updated_at = now();
        let row = row.clone();
        Ok(tables.department(&row))
    }

    async fn delete_department(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.departments.remove(&id).is_none() {
            return Err(StoreError::not_found("department", id));
        }
        for employee in tables.employees.values_mut() {
            if employee.department_id == Some(id) {
                employee.department_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for MemoryRepository {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.tables.read().await.employees.values().cloned().collect())
    }

    async fn find_employee(&self, id: i32) -> StoreResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn find_employee_by_account(&self, account_id: i32) -> StoreResult<Option<Employee>> {
        Ok(self
            .tables
            .read()
            .await
            .employees
            .values()
            .find(|e| e.account_id == Some(account_id))
            .cloned())
    }

    async fn employee_codes_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .tables
            .read()
            .await
            .employees
            .values()
            .filter(|e| e.employee_id.starts_with(prefix))
            .map(|e| e.employee_id.clone())
            .collect())
    }

    async fn insert_employee(&self, draft: &EmployeeDraft) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        if tables.employees.values().any(|e| e.employee_id == draft.employee_id) {
            return Err(StoreError::Conflict(format!(
                "Employee with ID {} already exists.",
                draft.employee_id
            )));
        }
        let id = next(&mut tables.seq.employee);
        let stamp = now();
        let employee = Employee {
            id,
            employee_id: draft.employee_id.clone(),
            account_id: draft.account_id,
            department_id: draft.department_id,
            position: draft.position.clone(),
            hire_date: draft.hire_date,
            status: draft.status,
            created_at: stamp,
            updated_at: stamp,
        };
        tables.employees.insert(id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, id: i32, changes: &UpdateEmployee) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        let employee = tables
            .employees
            .get_mut(&id)
            .ok_or(StoreError::not_found("employee", id))?;
        if let Some(account_id) = changes.account_id {
            employee.account_id = Some(account_id);
        }
        if let Some(department_id) = changes.department_id {
            employee.department_id = Some(department_id);
        }
        if let Some(position) = &changes.position {
            employee.position = position.clone();
        }
        if let Some(hire_date) = changes.hire_date {
            employee.hire_date = Some(hire_date);
        }
        if let Some(status) = changes.status {
            employee.status = status;
        }
        employee.updated_at = now();
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.employees.remove(&id).is_none() {
            return Err(StoreError::not_found("employee", id));
        }
        tables.requests.retain(|_, r| r.employee_id != id);
        tables.workflows.retain(|_, w| w.employee_id != id);
        Ok(())
    }
}

#[async_trait]
impl RequestStore for MemoryRepository {
    async fn list_requests(&self, employee_id: Option<i32>) -> StoreResult<Vec<Request>> {
        Ok(self
            .tables
            .read()
            .await
            .requests
            .values()
            .filter(|r| employee_id.map_or(true, |owner| r.employee_id == owner))
            .cloned()
            .collect())
    }

    async fn find_request(&self, id: i32) -> StoreResult<Option<Request>> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn insert_request(&self, draft: &RequestDraft) -> StoreResult<Request> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.request);
        let stamp = now();
        let request_items = tables.items(id, &draft.items);
        let request = Request {
            id,
            employee_id: draft.employee_id,
            request_type: draft.request_type,
            status: RequestStatus::Pending,
            created_at: stamp,
            updated_at: stamp,
            request_items,
        };
        tables.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn update_request(&self, id: i32, changes: &RequestChanges) -> StoreResult<Request> {
        let mut tables = self.tables.write().await;
        if !tables.requests.contains_key(&id) {
            return Err(StoreError::not_found("request", id));
        }
        let replacement = changes.items.as_ref().map(|drafts| tables.items(id, drafts));
        let request = tables
            .requests
            .get_mut(&id)
            .ok_or(StoreError::not_found("request", id))?;
        if let Some(request_type) = changes.request_type {
            request.request_type = request_type;
        }
        if let Some(status) = changes.status {
            request.status = status;
        }
        if let Some(items) = replacement {
            request.request_items = items;
        }
        request.updated_at = now();
        Ok(request.clone())
    }

    async fn set_request_status(&self, id: i32, status: RequestStatus) -> StoreResult<Request> {
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .get_mut(&id)
            .ok_or(StoreError::not_found("request", id))?;
        request.status = status;
        request.updated_at = now();
        Ok(request.clone())
    }

    async fn delete_request(&self, id: i32) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("request", id))
    }
}

#[async_trait]
impl WorkflowStore for MemoryRepository {
    async fn list_workflows(&self) -> StoreResult<Vec<Workflow>> {
        Ok(self.tables.read().await.workflows.values().cloned().collect())
    }

    async fn list_workflows_for_employee(&self, employee_id: i32) -> StoreResult<Vec<Workflow>> {
        Ok(self
            .tables
            .read()
            .await
            .workflows
            .values()
            .filter(|w| w.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn find_workflow(&self, id: i32) -> StoreResult<Option<Workflow>> {
        Ok(self.tables.read().await.workflows.get(&id).cloned())
    }

    async fn insert_workflow(&self, draft: &WorkflowDraft) -> StoreResult<Workflow> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.workflow);
        let stamp = now();
        // Round-trip through the storage representation, as the TEXT column does.
        let workflow = Workflow {
            id,
            employee_id: draft.employee_id,
            workflow_type: draft.workflow_type,
            details: draft.details.to_storage_text().into(),
            request_id: draft.request_id,
            status: draft.status,
            created_at: stamp,
            updated_at: stamp,
        };
        tables.workflows.insert(id, workflow.clone());
        Ok(workflow)
    }

    async fn set_workflow_status(&self, id: i32, status: WorkflowStatus) -> StoreResult<Workflow> {
        let mut tables = self.tables.write().await;
        let workflow = tables
            .workflows
            .get_mut(&id)
            .ok_or(StoreError::not_found("workflow", id))?;
        workflow.status = status;
        workflow.updated_at = now();
        Ok(workflow.clone())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::employee::EmployeeStatus;
    use crate::db::models::requests::RequestType;

    fn draft(code: &str, department_id: Option<i32>) -> EmployeeDraft {
        EmployeeDraft {
            employee_id: code.to_string(),
            account_id: None,
            department_id,
            position: "Developer".into(),
            hire_date: None,
            status: EmployeeStatus::Active,
        }
    }

    #[test]
    fn department_names_are_unique_ignoring_case() {
        tokio_test::block_on(async {
            let repo = MemoryRepository::new();
            repo.insert_department(&NewDepartment { name: "Engineering".into(), description: None })
                .await
                .unwrap();
            let err = repo
                .insert_department(&NewDepartment { name: "engineering".into(), description: None })
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Conflict(_)));
        });
    }

    #[tokio::test]
    async fn employee_count_follows_assignments_and_deletes() {
        let repo = MemoryRepository::new();
        let dept = repo
            .insert_department(&NewDepartment { name: "Ops".into(), description: None })
            .await
            .unwrap();
        repo.insert_employee(&draft("EMP001", Some(dept.id))).await.unwrap();
        repo.insert_employee(&draft("EMP002", Some(dept.id))).await.unwrap();

        let dept = repo.find_department(dept.id).await.unwrap().unwrap();
        assert_eq!(dept.employee_count, 2);

        repo.delete_department(dept.id).await.unwrap();
        let employees = repo.list_employees().await.unwrap();
        assert!(employees.iter().all(|e| e.department_id.is_none()));
    }

    #[tokio::test]
    async fn duplicate_employee_code_conflicts() {
        let repo = MemoryRepository::new();
        repo.insert_employee(&draft("EMP001", None)).await.unwrap();
        let err = repo.insert_employee(&draft("EMP001", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_request_removes_its_items() {
        let repo = MemoryRepository::new();
        let owner = repo.insert_employee(&draft("EMP001", None)).await.unwrap();
        let request = repo
            .insert_request(&RequestDraft {
                employee_id: owner.id,
                request_type: RequestType::Equipment,
                items: vec![ItemDraft { name: "Laptop".into(), quantity: 1 }],
            })
            .await
            .unwrap();
        assert_eq!(request.request_items.len(), 1);

        repo.delete_request(request.id).await.unwrap();
        assert!(repo.find_request(request.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_request(request.id).await,
            Err(StoreError::NotFound { entity: "request", .. })
        ));
    }

    #[tokio::test]
    async fn replacing_items_keeps_request_identity() {
        let repo = MemoryRepository::new();
        let owner = repo.insert_employee(&draft("EMP001", None)).await.unwrap();
        let request = repo
            .insert_request(&RequestDraft {
                employee_id: owner.id,
                request_type: RequestType::Equipment,
                items: vec![ItemDraft { name: "Mouse".into(), quantity: 2 }],
            })
            .await
            .unwrap();

        let updated = repo
            .update_request(
                request.id,
                &RequestChanges {
                    items: Some(vec![
                        ItemDraft { name: "Monitor".into(), quantity: 1 },
                        ItemDraft { name: "Cable".into(), quantity: 3 },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, request.id);
        let names: Vec<_> = updated.request_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Monitor", "Cable"]);
    }
}

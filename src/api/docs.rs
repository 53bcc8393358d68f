use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::{Modify, OpenApi};

use crate::db::queries::departments::DepartmentDoc;
use crate::db::queries::employees::EmployeeDoc;
use crate::db::queries::requests::RequestDoc;
use crate::db::queries::workflows::WorkflowDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.clone().unwrap_or(Components::default());
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        openapi.components = Some(components);
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "HR backend", description = "Employees, requests and approval workflows"),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Every documented route merged into one document.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
        .merge_from(DepartmentDoc::openapi())
        .merge_from(EmployeeDoc::openapi())
        .merge_from(RequestDoc::openapi())
        .merge_from(WorkflowDoc::openapi())
}

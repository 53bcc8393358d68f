//! Workflow engine: audit rows for employee/request actions and the
//! workflow-to-request status mirror.

pub mod audit;
pub mod backref;
pub mod status_sync;

pub use status_sync::{update_workflow_status, StatusSync, StatusUpdate};

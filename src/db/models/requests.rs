// src/db/models/requests.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

text_enum! {
    pub enum RequestType {
        Equipment => "Equipment",
        Leave => "Leave",
        Training => "Training",
        Other => "Other",
    }
}

text_enum! {
    pub enum RequestStatus {
        Pending => "Pending",
        Approved => "Approved",
        Rejected => "Rejected",
        Completed => "Completed",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub id: i32,
    pub request_id: i32,
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: i32,
    pub employee_id: i32,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub request_type: RequestType,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Line items in insertion order.
    #[sqlx(skip)]
    pub request_items: Vec<RequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewRequestItem {
    pub name: String,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    /// Defaults to the caller's own employee record.
    pub employee_id: Option<i32>,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub items: Option<Vec<NewRequestItem>>,
    /// Alternate spelling of `items` sent by older clients.
    pub request_items: Option<Vec<NewRequestItem>>,
}

impl NewRequest {
    /// `items` wins when it is non-empty, otherwise `requestItems` is used.
    pub fn submitted_items(&self) -> &[NewRequestItem] {
        match (&self.items, &self.request_items) {
            (Some(items), _) if !items.is_empty() => items,
            (_, Some(items)) => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
    pub status: Option<RequestStatus>,
    /// When present (even empty) the request's items are replaced.
    pub items: Option<Vec<NewRequestItem>>,
    pub request_items: Option<Vec<NewRequestItem>>,
}

impl UpdateRequest {
    pub fn submitted_items(&self) -> Option<&[NewRequestItem]> {
        self.items
            .as_deref()
            .or(self.request_items.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub employee_id: i32,
    pub request_type: RequestType,
    pub items: Vec<ItemDraft>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestChanges {
    pub request_type: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub items: Option<Vec<ItemDraft>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    /// Restrict the listing to one employee.
    pub employee_id: Option<i32>,
}

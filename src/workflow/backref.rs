//! Recovery of the request a workflow refers to.
//!
//! Rows written by this service carry an explicit `request_id`. Older rows
//! only mention the request somewhere inside `details`, either as a JSON
//! field or in narrative text, so those are recovered by parsing. Do not
//! extend the text patterns; new producers must set `request_id`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::db::models::workflow::{Workflow, WorkflowDetails};

/// Where a recovered request id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackRefSource {
    Caller,
    Column,
    StructuredDetails,
    ParsedDetails,
    BoldLabel,
    PlainLabel,
    Narrative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackRef {
    pub request_id: i32,
    pub source: BackRefSource,
}

static BOLD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<b>\s*requestId:\s*</b>\s*(\d+)").expect("static pattern")
});
static PLAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)requestId:\s*(\d+)").expect("static pattern"));
static NARRATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)request #(\d+)").expect("static pattern"));

/// Accepts a positive integer given either as a JSON number or as a numeric
/// string. Anything else is not a usable id.
pub fn coerce_request_id(value: &Value) -> Option<i32> {
    let id = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

fn from_map(map: &Map<String, Value>) -> Option<i32> {
    map.get("requestId").and_then(coerce_request_id)
}

fn from_text(text: &str) -> Option<BackRef> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') {
        // A well-formed payload is authoritative: no text fallback when the
        // field is simply absent.
        if let Ok(map) = serde_json::from_str::<Map<String, Value>>(trimmed) {
            return from_map(&map).map(|request_id| BackRef {
                request_id,
                source: BackRefSource::ParsedDetails,
            });
        }
    }

    [
        (&*BOLD_LABEL, BackRefSource::BoldLabel),
        (&*PLAIN_LABEL, BackRefSource::PlainLabel),
        (&*NARRATIVE, BackRefSource::Narrative),
    ]
    .into_iter()
    .find_map(|(pattern, source)| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .filter(|id| *id > 0)
            .map(|request_id| BackRef { request_id, source })
    })
}

/// Extracts a request id from a details payload alone.
pub fn from_details(details: &WorkflowDetails) -> Option<BackRef> {
    match details {
        WorkflowDetails::Structured(map) => from_map(map).map(|request_id| BackRef {
            request_id,
            source: BackRefSource::StructuredDetails,
        }),
        WorkflowDetails::Text(text) => from_text(text),
    }
}

/// Resolves the request a workflow refers to, in priority order: the
/// caller's explicit id, the `request_id` column, then `details`.
pub fn resolve(workflow: &Workflow, explicit: Option<i32>) -> Option<BackRef> {
    if let Some(request_id) = explicit.filter(|id| *id > 0) {
        return Some(BackRef { request_id, source: BackRefSource::Caller });
    }
    if let Some(request_id) = workflow.request_id.filter(|id| *id > 0) {
        return Some(BackRef { request_id, source: BackRefSource::Column });
    }
    from_details(&workflow.details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> WorkflowDetails {
        WorkflowDetails::Text(s.to_string())
    }

    #[test]
    fn structured_payload_with_numeric_id() {
        let details = WorkflowDetails::structured(json!({"requestId": 7, "requestType": "Equipment"}));
        assert_eq!(
            from_details(&details),
            Some(BackRef { request_id: 7, source: BackRefSource::StructuredDetails })
        );
    }

    #[test]
    fn structured_payload_with_string_id() {
        let details = WorkflowDetails::structured(json!({"requestId": "15"}));
        assert_eq!(from_details(&details).map(|b| b.request_id), Some(15));
    }

    #[test]
    fn serialized_json_text_is_parsed() {
        let details = text(r#"{"requestId": 7, "requestType":"Equipment", "message":"Review"}"#);
        assert_eq!(
            from_details(&details),
            Some(BackRef { request_id: 7, source: BackRefSource::ParsedDetails })
        );
    }

    #[test]
    fn parsed_json_without_id_does_not_fall_back_to_patterns() {
        let details = text(r#"{"task":"Setup workstation","message":"see request #4"}"#);
        assert_eq!(from_details(&details), None);
    }

    #[test]
    fn narrative_pattern() {
        let details = text("Review Equipment request #12 from Employee ID EMP001.");
        assert_eq!(
            from_details(&details),
            Some(BackRef { request_id: 12, source: BackRefSource::Narrative })
        );
    }

    #[test]
    fn bold_label_wins_over_narrative() {
        let details = text("<p><b>requestId:</b> 31</p><p>Review Leave request #99</p>");
        assert_eq!(
            from_details(&details),
            Some(BackRef { request_id: 31, source: BackRefSource::BoldLabel })
        );
    }

    #[test]
    fn plain_label_is_case_insensitive() {
        let details = text("RequestID: 8 pending review");
        assert_eq!(
            from_details(&details),
            Some(BackRef { request_id: 8, source: BackRefSource::PlainLabel })
        );
    }

    #[test]
    fn malformed_json_falls_back_to_patterns() {
        let details = text("{not json} request #5");
        assert_eq!(from_details(&details).map(|b| b.request_id), Some(5));
    }

    #[test]
    fn nothing_recoverable() {
        assert_eq!(from_details(&text("Employee transferred from A to B.")), None);
        assert_eq!(from_details(&text("")), None);
        assert_eq!(from_details(&text("request #0")), None);
    }

    #[test]
    fn coercion_rejects_non_positive_and_non_numeric() {
        assert_eq!(coerce_request_id(&json!(3)), Some(3));
        assert_eq!(coerce_request_id(&json!(" 42 ")), Some(42));
        assert_eq!(coerce_request_id(&json!(0)), None);
        assert_eq!(coerce_request_id(&json!(-4)), None);
        assert_eq!(coerce_request_id(&json!("abc")), None);
        assert_eq!(coerce_request_id(&json!(null)), None);
        assert_eq!(coerce_request_id(&json!(1.5)), None);
    }
}

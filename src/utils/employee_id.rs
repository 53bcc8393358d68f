//! Human-readable employee codes: `EMP` followed by a counter padded to
//! three digits (`EMP001`, `EMP042`, `EMP1000`).
//!
//! Generation reads the current codes and picks the next one; two callers
//! racing between read and insert can compute the same code. The unique
//! index on `employees.employee_id` turns the loser into a 409.

use std::collections::HashSet;
use std::str::FromStr;

pub const PREFIX: &str = "EMP";

/// How the next code is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Lowest unused counter, reusing gaps left by deleted employees.
    #[default]
    ScanAndIncrement,
    /// One past the highest counter in use; gaps are never reused.
    MaxPlusOne,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scan" | "scan-and-increment" => Ok(IdStrategy::ScanAndIncrement),
            "max" | "max-plus-one" => Ok(IdStrategy::MaxPlusOne),
            other => Err(format!("unknown employee id strategy '{other}' (expected 'scan' or 'max')")),
        }
    }
}

pub fn format_code(counter: u32) -> String {
    format!("{PREFIX}{counter:03}")
}

/// Counter of a well-formed code, `None` for anything else.
pub fn parse_counter(code: &str) -> Option<u32> {
    let digits = code.strip_prefix(PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn scan_and_increment<S: AsRef<str>>(existing: &[S]) -> String {
    let taken: HashSet<&str> = existing.iter().map(AsRef::as_ref).collect();
    (1u32..)
        .map(format_code)
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| format_code(u32::MAX))
}

pub fn max_plus_one<S: AsRef<str>>(existing: &[S]) -> String {
    let max = existing
        .iter()
        .filter_map(|code| parse_counter(code.as_ref()))
        .max()
        .unwrap_or(0);
    format_code(max.saturating_add(1))
}

impl IdStrategy {
    pub fn next_code<S: AsRef<str>>(self, existing: &[S]) -> String {
        match self {
            IdStrategy::ScanAndIncrement => scan_and_increment(existing),
            IdStrategy::MaxPlusOne => max_plus_one(existing),
        }
    }
}

//! Response validation against a resource's acceptance criteria.
//!
//! # Design Decisions
//! - Pure function of its inputs: no I/O, no mutation
//! - Status range is the minimal criterion; required fields are checked
//!   against the mapped body's top-level JSON object
//! - The reason string is diagnostic only and never reaches clients

use crate::config::AcceptanceCriteria;
use crate::mapping::NormalizedResponse;

/// Verdict for one attempt, computed fresh each time.
#[derive(Debug)]
pub struct ValidationResult {
    pub passed: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decide whether a normalized response satisfies the criteria.
pub fn validate(response: &NormalizedResponse, criteria: &AcceptanceCriteria) -> ValidationResult {
    let status = response.status.as_u16();
    if status < criteria.status_min || status > criteria.status_max {
        return ValidationResult::fail(format!(
            "status {status} outside accepted range {}..={}",
            criteria.status_min, criteria.status_max
        ));
    }

    if !criteria.required_fields.is_empty() {
        let Some(fields) = &response.fields else {
            return ValidationResult::fail("response body is not a JSON object");
        };
        for field in &criteria.required_fields {
            if !fields.contains_key(field) {
                return ValidationResult::fail(format!("missing required field `{field}`"));
            }
        }
    }

    ValidationResult::pass()
}

use serde_json::Value;
use thiserror::Error;

use super::ai_data::AiAnalysisData;

#[derive(Debug, Error)]
pub enum AnalysisDataError {
    #[error("empty analysis response")]
    Empty,
    #[error("analysis response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("analysis response does not match schema: {0}")]
    Schema(#[source] serde_json::Error),
}

/// Parse a raw model response into validated analysis data.
///
/// Models occasionally wrap JSON in a markdown fence despite being told not to,
/// so a single surrounding fence is tolerated.
pub fn parse_ai_analysis(raw: &str) -> Result<AiAnalysisData, AnalysisDataError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(AnalysisDataError::Empty);
    }
    let value: Value = serde_json::from_str(body).map_err(AnalysisDataError::InvalidJson)?;
    validate_value(value)
}

/// Validate an already-decoded JSON document, e.g. a stored `ai_data` column.
pub fn validate_value(value: Value) -> Result<AiAnalysisData, AnalysisDataError> {
    serde_json::from_value(value).map_err(AnalysisDataError::Schema)
}

pub(crate) fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // drop the optional language tag on the opening line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

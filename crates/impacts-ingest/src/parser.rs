use serde_json::Value;

use crate::error::IngestError;

/// Strict JSON parse of pasted or uploaded text.
///
/// No JSON5, comments or trailing commas. The error carries serde_json's
/// diagnostic, including line and column.
pub fn parse_json(raw: &str) -> Result<Value, IngestError> {
    if raw.trim().is_empty() {
        return Err(IngestError::Syntax("input is empty".to_string()));
    }
    serde_json::from_str(raw).map_err(|e| IngestError::Syntax(e.to_string()))
}

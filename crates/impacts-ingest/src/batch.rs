//! Pre-submission checks for batch imports.
//!
//! A batch is all-or-nothing on this side: one invalid element blocks the whole
//! submission. The server still inserts items independently and reports
//! per-index failures.

use impacts_core::models::BatchImportReport;
use serde_json::Value;

use crate::error::IngestError;
use crate::gateway::PersistenceGateway;
use crate::parser::parse_json;

/// Fields every batch element must carry as non-empty strings
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "sector", "region"];

fn has_required_fields(item: &Value) -> bool {
    item.as_object().is_some_and(|obj| {
        REQUIRED_FIELDS.iter().all(|field| {
            obj.get(*field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        })
    })
}

/// Check an already-parsed batch. On success the elements are returned as-is.
pub fn validate_batch_value(value: Value) -> Result<Vec<Value>, IngestError> {
    let Value::Array(items) = value else {
        return Err(IngestError::NotAnArray);
    };
    let invalid = items.iter().filter(|item| !has_required_fields(item)).count();
    if invalid > 0 {
        return Err(IngestError::InvalidBatch {
            invalid,
            total: items.len(),
        });
    }
    Ok(items)
}

/// Parse and check raw batch text.
pub fn validate_batch(raw: &str) -> Result<Vec<Value>, IngestError> {
    validate_batch_value(parse_json(raw)?)
}

/// Validate `raw` and, only if every element passes, forward it to the gateway.
pub async fn import_batch(
    raw: &str,
    gateway: &dyn PersistenceGateway,
) -> Result<BatchImportReport, IngestError> {
    let items = validate_batch(raw)?;
    tracing::debug!(count = items.len(), "Submitting organization batch");
    let report = gateway.create_batch(&items).await?;
    tracing::info!(
        successful = report.successful,
        failed = report.failed,
        "Organization batch imported"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_batch_is_returned_unmodified() {
        let raw = r#"[
            {"name":"A","sector":"Education","region":"ON","extra":{"kept":true}},
            {"name":"B","sector":"Health","region":"QC","impactScore":900}
        ]"#;
        let items = validate_batch(raw).unwrap();
        let expected: Vec<Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(items, expected);
    }

    #[test]
    fn counts_every_invalid_element() {
        let raw = json!([
            {"name": "A"},
            {"name": "B", "sector": "Health", "region": "QC"},
            {"name": "", "sector": "Health", "region": "QC"},
            {"name": "C", "sector": 5, "region": "QC"},
            "not an object"
        ]);
        match validate_batch_value(raw).unwrap_err() {
            IngestError::InvalidBatch { invalid, total } => {
                assert_eq!(invalid, 4);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn required_fields_must_be_strings() {
        // The single-record mapper would stringify these; batch items go to the
        // server verbatim, so they must already be strings.
        for item in [
            json!({"name": "A", "sector": 5, "region": "QC"}),
            json!({"name": 12, "sector": "Health", "region": "QC"}),
            json!({"name": "A", "sector": "Health", "region": true}),
            json!({"name": "A", "sector": "Health", "region": null}),
        ] {
            assert!(matches!(
                validate_batch_value(json!([item])),
                Err(IngestError::InvalidBatch { invalid: 1, total: 1 })
            ));
        }
        assert!(validate_batch_value(json!([{"name": "5", "sector": "Health", "region": "QC"}])).is_ok());
    }

    #[test]
    fn single_incomplete_element_message() {
        let err = validate_batch(r#"[{"name":"A"}]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 organization(s) are missing required fields (name, sector, region)"
        );
    }

    #[test]
    fn non_array_rejected() {
        assert!(matches!(
            validate_batch(r#"{"name":"A","sector":"S","region":"R"}"#),
            Err(IngestError::NotAnArray)
        ));
        assert!(matches!(
            validate_batch("[{"),
            Err(IngestError::Syntax(_))
        ));
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(validate_batch("[]").unwrap().is_empty());
    }
}

use crate::gateway::GatewayError;
use crate::session::SessionState;

/// Errors raised before or while a candidate is handed to the gateway.
///
/// Syntax, shape and validation errors are all raised locally and never reach
/// the network.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    Syntax(String),

    #[error("Expected a JSON object describing one organization")]
    NotAnObject,

    #[error("Expected a JSON array of organizations")]
    NotAnArray,

    #[error("{invalid} organization(s) are missing required fields (name, sector, region)")]
    InvalidBatch { invalid: usize, total: usize },

    #[error("File is too large ({size} bytes, limit {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("File is not valid UTF-8 text")]
    NotUtf8,

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Cannot {operation} while the import is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IngestError {
    /// Field names with errors, for inline display next to form inputs
    pub fn invalid_fields(&self) -> Vec<String> {
        match self {
            IngestError::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .into_keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort_unstable();
                fields
            }
            _ => Vec::new(),
        }
    }
}

//! Raw input acceptance for uploaded files.

use std::path::Path;

use crate::error::IngestError;

/// Default upload cap (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_size_bytes: usize,
    /// Lowercase extensions without the dot. Empty accepts any file name.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["json".to_string(), "txt".to_string()],
        }
    }
}

/// Check an uploaded file against `limits` and return its text.
///
/// Content is not parsed here; callers run [`crate::parse_json`] afterwards.
pub fn accept_upload(
    file_name: Option<&str>,
    bytes: &[u8],
    limits: &UploadLimits,
) -> Result<String, IngestError> {
    if bytes.len() > limits.max_size_bytes {
        return Err(IngestError::TooLarge {
            size: bytes.len(),
            max: limits.max_size_bytes,
        });
    }

    if let Some(name) = file_name {
        if !limits.allowed_extensions.is_empty() {
            let extension = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_default();
            if !limits.allowed_extensions.iter().any(|a| *a == extension) {
                return Err(IngestError::UnsupportedFile(name.to_string()));
            }
        }
    }

    let text = std::str::from_utf8(bytes).map_err(|_| IngestError::NotUtf8)?;
    // Editors on Windows like to prepend a BOM, which serde_json rejects.
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_and_txt() {
        let limits = UploadLimits::default();
        assert_eq!(
            accept_upload(Some("orgs.JSON"), b"{}", &limits).unwrap(),
            "{}"
        );
        assert!(accept_upload(Some("orgs.txt"), b"[]", &limits).is_ok());
        assert!(accept_upload(None, b"[]", &limits).is_ok());
    }

    #[test]
    fn rejects_oversized_files() {
        let limits = UploadLimits {
            max_size_bytes: 4,
            ..Default::default()
        };
        let err = accept_upload(Some("a.json"), b"{\"a\":1}", &limits).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { size: 7, max: 4 }));
    }

    #[test]
    fn cap_is_inclusive() {
        let limits = UploadLimits::default();
        let at_cap = vec![b' '; MAX_UPLOAD_BYTES];
        assert_eq!(
            accept_upload(Some("a.json"), &at_cap, &limits).unwrap().len(),
            MAX_UPLOAD_BYTES
        );

        let over = vec![b' '; MAX_UPLOAD_BYTES + 1];
        let err = accept_upload(Some("a.json"), &over, &limits).unwrap_err();
        assert!(matches!(
            err,
            IngestError::TooLarge { size, max } if size == MAX_UPLOAD_BYTES + 1 && max == MAX_UPLOAD_BYTES
        ));
    }

    #[test]
    fn rejects_other_types_and_binary() {
        let limits = UploadLimits::default();
        assert!(matches!(
            accept_upload(Some("logo.png"), b"{}", &limits),
            Err(IngestError::UnsupportedFile(_))
        ));
        assert!(matches!(
            accept_upload(Some("a.json"), &[0xff, 0xfe, 0x00], &limits),
            Err(IngestError::NotUtf8)
        ));
    }

    #[test]
    fn strips_byte_order_mark() {
        let text = accept_upload(Some("a.json"), "\u{feff}{}".as_bytes(), &UploadLimits::default())
            .unwrap();
        assert_eq!(text, "{}");
    }
}

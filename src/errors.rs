//! Registry Error Envelope
//!
//! Models the JSON error body that OCI-compliant registries return for
//! failed requests:
//!
//! ```json
//! { "errors": [ { "code": "...", "message": "...", "detail": ... } ] }
//! ```
//!
//! The envelope is a decoding target only: `code` and `message` are
//! carried verbatim and `detail` stays opaque, since its shape varies by
//! error code. See:
//! https://github.com/opencontainers/distribution-spec/blob/main/spec.md#error-codes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single error record reported by a registry
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Machine-readable identifier (e.g., "NAME_UNKNOWN", "MANIFEST_UNKNOWN")
    pub code: String,

    /// Human-readable description
    pub message: String,

    /// Free-form payload whose shape varies by error code.
    /// A missing field and an explicit `null` both decode to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Create an error record without a detail payload
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// Create an error record carrying a detail payload
    pub fn with_detail(
        code: impl Into<String>,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: Some(detail),
        }
    }
}

/// Error envelope for a single failed request
///
/// Entries keep the order the registry reported them in. An envelope with
/// zero entries is unusual but valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Reported errors
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "registry reported an error without details");
        }

        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_name_unknown() {
        let body = r#"{"errors":[{"code":"NAME_UNKNOWN","message":"repository name not known to registry","detail":null}]}"#;

        let response: ErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].code, "NAME_UNKNOWN");
        assert_eq!(
            response.errors[0].message,
            "repository name not known to registry"
        );
        assert!(response.errors[0].detail.is_none());
    }

    #[test]
    fn test_decode_empty_envelope() {
        let response: ErrorResponse = serde_json::from_str(r#"{"errors":[]}"#).unwrap();
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_decode_missing_errors_key() {
        let response: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_null_and_absent_detail_are_equivalent() {
        let with_null: ErrorResponse = serde_json::from_str(
            r#"{"errors":[{"code":"DENIED","message":"access denied","detail":null}]}"#,
        )
        .unwrap();
        let without: ErrorResponse =
            serde_json::from_str(r#"{"errors":[{"code":"DENIED","message":"access denied"}]}"#)
                .unwrap();

        assert_eq!(with_null, without);
        assert!(with_null.errors[0].detail.is_none());
    }

    #[test]
    fn test_detail_preserved_verbatim() {
        let body = r#"{"errors":[{"code":"MANIFEST_INVALID","message":"manifest invalid","detail":{"digest":"sha256:deadbeef","line":4}}]}"#;

        let response: ErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            response.errors[0].detail,
            Some(json!({"digest": "sha256:deadbeef", "line": 4}))
        );
    }

    #[test]
    fn test_order_preserved() {
        let body = r#"{"errors":[
            {"code":"A_FIRST","message":"first"},
            {"code":"B_SECOND","message":"second"},
            {"code":"C_THIRD","message":"third"}
        ]}"#;

        let response: ErrorResponse = serde_json::from_str(body).unwrap();

        let codes: Vec<&str> = response.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["A_FIRST", "B_SECOND", "C_THIRD"]);
    }

    #[test]
    fn test_structural_equality() {
        let a = ApiError::with_detail("TAG_INVALID", "bad tag", json!({"tag": "!!"}));
        let b = ApiError::with_detail("TAG_INVALID", "bad tag", json!({"tag": "!!"}));
        assert_eq!(a, b);

        let other_code = ApiError::with_detail("NAME_INVALID", "bad tag", json!({"tag": "!!"}));
        let other_message = ApiError::with_detail("TAG_INVALID", "worse tag", json!({"tag": "!!"}));
        let other_detail = ApiError::new("TAG_INVALID", "bad tag");
        assert_ne!(a, other_code);
        assert_ne!(a, other_message);
        assert_ne!(a, other_detail);
    }

    #[test]
    fn test_field_round_trip() {
        let err = ApiError::with_detail("UNAUTHORIZED", "authentication required", json!(42));
        assert_eq!(err.code, "UNAUTHORIZED");
        assert_eq!(err.message, "authentication required");
        assert_eq!(err.detail, Some(json!(42)));

        let plain = ApiError::new("DENIED", "no");
        assert!(plain.detail.is_none());
    }

    #[test]
    fn test_serialize_skips_absent_detail() {
        let envelope = ErrorResponse {
            errors: vec![ApiError::new("BLOB_UNKNOWN", "blob unknown to registry")],
        };

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(!json.contains("detail"));
    }

    #[test]
    fn test_display() {
        let envelope = ErrorResponse {
            errors: vec![
                ApiError::new("DENIED", "access denied"),
                ApiError::new("TOOMANYREQUESTS", "slow down"),
            ],
        };
        assert_eq!(
            envelope.to_string(),
            "DENIED: access denied; TOOMANYREQUESTS: slow down"
        );

        let empty = ErrorResponse::default();
        assert_eq!(
            empty.to_string(),
            "registry reported an error without details"
        );
    }
}

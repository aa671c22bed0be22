//! Request validation: raw JSON payload → [`ImageSubmission`].
//!
//! Runs before anything touches the network so a bad payload never costs an
//! inference call. Only two things are checked: the declared mime type starts
//! with `image/`, and the image decodes as base64. There is deliberately no
//! size limit, dimension check, or magic-byte comparison against the declared
//! mime type.

use crate::error::CertVerifyError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of `POST /process-image` as sent by the client.
///
/// Every field is optional at the serde level so that a missing `mimetype`
/// is reported as [`CertVerifyError::InvalidMimeType`] rather than a generic
/// deserialisation failure. All three are still required by
/// [`validate_request`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub image: Option<String>,
    /// Original file name; carried for logging only.
    #[serde(default)]
    pub filename: Option<String>,
    /// Declared mime type, e.g. `image/png`.
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl ImageRequest {
    /// Build a request from already-known parts.
    pub fn new(
        image: impl Into<String>,
        filename: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            image: Some(image.into()),
            filename: Some(filename.into()),
            mimetype: Some(mimetype.into()),
        }
    }
}

/// A validated, decoded submission. Owned by a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSubmission {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

/// Validate and decode a request.
///
/// Checks run in order: mime type, image encoding, filename presence. A
/// request that is wrong on several counts reports the first failure.
pub fn validate_request(request: &ImageRequest) -> Result<ImageSubmission, CertVerifyError> {
    let mime_type = check_mime_type(request.mimetype.as_deref())?;
    let image_bytes = decode_image(request.image.as_deref())?;
    let filename = request
        .filename
        .clone()
        .ok_or_else(|| CertVerifyError::InvalidRequestBody {
            detail: "missing field `filename`".into(),
        })?;

    debug!(
        "Validated submission '{}': {} ({} bytes)",
        filename,
        mime_type,
        image_bytes.len()
    );

    Ok(ImageSubmission {
        image_bytes,
        mime_type: mime_type.to_string(),
        filename,
    })
}

/// Literal, case-sensitive `image/` prefix check.
fn check_mime_type(mimetype: Option<&str>) -> Result<&str, CertVerifyError> {
    match mimetype {
        Some(m) if m.starts_with("image/") => Ok(m),
        other => Err(CertVerifyError::InvalidMimeType {
            mimetype: other.map(str::to_string),
        }),
    }
}

/// Decode standard-alphabet, padded base64. ASCII whitespace (line breaks
/// inserted by MIME encoders) is ignored.
fn decode_image(image: Option<&str>) -> Result<Vec<u8>, CertVerifyError> {
    let raw = image.unwrap_or_default();
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(CertVerifyError::InvalidImageEncoding {
            detail: "image is empty".into(),
        });
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CertVerifyError::InvalidImageEncoding {
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_request(mimetype: Option<&str>) -> ImageRequest {
        ImageRequest {
            image: Some(STANDARD.encode(b"\x89PNG\r\n\x1a\nfake")),
            filename: Some("cert.png".into()),
            mimetype: mimetype.map(str::to_string),
        }
    }

    #[test]
    fn accepts_image_png() {
        let sub = validate_request(&png_request(Some("image/png"))).unwrap();
        assert_eq!(sub.mime_type, "image/png");
        assert_eq!(sub.filename, "cert.png");
        assert_eq!(sub.image_bytes, b"\x89PNG\r\n\x1a\nfake");
    }

    #[test]
    fn rejects_non_image_mime_types() {
        for m in ["application/pdf", "text/plain", "", "IMAGE/PNG"] {
            let err = validate_request(&png_request(Some(m))).unwrap_err();
            assert!(
                matches!(err, CertVerifyError::InvalidMimeType { .. }),
                "{m:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_absent_mime_type() {
        let err = validate_request(&png_request(None)).unwrap_err();
        assert!(matches!(
            err,
            CertVerifyError::InvalidMimeType { mimetype: None }
        ));
    }

    #[test]
    fn malformed_base64_is_always_the_same_error() {
        let req = ImageRequest::new("!!!not base64!!!", "x.png", "image/png");
        for _ in 0..2 {
            let err = validate_request(&req).unwrap_err();
            assert!(matches!(err, CertVerifyError::InvalidImageEncoding { .. }));
        }
    }

    #[test]
    fn rejects_missing_padding() {
        let req = ImageRequest::new("aGVsbG8", "x.png", "image/png");
        assert!(matches!(
            validate_request(&req),
            Err(CertVerifyError::InvalidImageEncoding { .. })
        ));
    }

    #[test]
    fn rejects_empty_or_absent_image() {
        let req = ImageRequest::new("", "x.png", "image/png");
        assert!(matches!(
            validate_request(&req),
            Err(CertVerifyError::InvalidImageEncoding { .. })
        ));

        let req = ImageRequest {
            image: None,
            ..png_request(Some("image/png"))
        };
        assert!(matches!(
            validate_request(&req),
            Err(CertVerifyError::InvalidImageEncoding { .. })
        ));
    }

    #[test]
    fn ignores_line_breaks_in_base64() {
        let req = ImageRequest::new("aGVs\nbG8=\r\n", "x.png", "image/jpeg");
        let sub = validate_request(&req).unwrap();
        assert_eq!(sub.image_bytes, b"hello");
    }

    #[test]
    fn mime_type_checked_before_encoding() {
        let req = ImageRequest::new("!!!", "x.txt", "text/plain");
        assert!(matches!(
            validate_request(&req),
            Err(CertVerifyError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn rejects_absent_filename() {
        let req = ImageRequest {
            filename: None,
            ..png_request(Some("image/png"))
        };
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, CertVerifyError::InvalidRequestBody { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn empty_filename_is_accepted() {
        let req = ImageRequest {
            filename: Some(String::new()),
            ..png_request(Some("image/png"))
        };
        assert_eq!(validate_request(&req).unwrap().filename, "");
    }

    #[test]
    fn missing_mimetype_wins_over_missing_filename() {
        let req = ImageRequest {
            filename: None,
            ..png_request(None)
        };
        assert!(matches!(
            validate_request(&req),
            Err(CertVerifyError::InvalidMimeType { mimetype: None })
        ));
    }
}

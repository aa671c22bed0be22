//! Error types for the edgequake-certverify library.
//!
//! A single error enum, [`CertVerifyError`], covers every way a submission can
//! fail to produce a [`crate::Verdict`]. Each variant belongs to exactly one
//! [`ErrorKind`]:
//!
//! * [`ErrorKind::Input`] — the caller sent something unusable (bad mime type,
//!   bad base64). Always raised before the model is called, so invalid input
//!   never costs an inference request. HTTP 400.
//!
//! * [`ErrorKind::Upstream`] — the model answered, but not with something we
//!   can read (empty or malformed reply), or it did not answer in time. The
//!   caller may retry unchanged. HTTP 502.
//!
//! * [`ErrorKind::Internal`] — anything else (transport failure, provider not
//!   configured). HTTP 500.
//!
//! Note that "not a certificate" is **not** an error: it is the normal
//! [`crate::Verdict::Unverified`] outcome.
//!
//! Two renderings exist for every error. `Display` is the server-side
//! diagnostic and may contain the raw model reply; [`CertVerifyError::public_message`]
//! is the only text that may be returned to a caller.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`CertVerifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad client input; fix the request and resubmit.
    Input,
    /// The inference model misbehaved; may be transient.
    Upstream,
    /// Unexpected failure inside the service.
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Input => 400,
            ErrorKind::Upstream => 502,
            ErrorKind::Internal => 500,
        }
    }
}

/// All errors returned by the edgequake-certverify library.
#[derive(Debug, Error)]
pub enum CertVerifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request body could not be read as a JSON object.
    #[error("Invalid request body: {detail}")]
    InvalidRequestBody { detail: String },

    /// `mimetype` was absent or does not start with `image/`.
    #[error("Invalid mimetype {mimetype:?}: expected an image/* type")]
    InvalidMimeType { mimetype: Option<String> },

    /// `image` was absent, empty, or not valid base64.
    #[error("Invalid image encoding: {detail}")]
    InvalidImageEncoding { detail: String },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The model returned no text at all.
    #[error("Model returned an empty reply")]
    EmptyModelReply,

    /// The model reply is not exactly one JSON object.
    #[error("Model reply is not a JSON object: {reason}\nRaw reply: {raw:?}")]
    MalformedModelReply { reason: String, raw: String },

    /// The model call exceeded the configured timeout.
    #[error("Model call timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    // ── Internal errors ───────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API call failed at the transport or provider level.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A local image passed to `certverify check` does not exist.
    #[error("Image file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// An image URL passed to `certverify check` could not be fetched.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CertVerifyError {
    /// Which side of the taxonomy this error falls on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CertVerifyError::InvalidRequestBody { .. }
            | CertVerifyError::InvalidMimeType { .. }
            | CertVerifyError::InvalidImageEncoding { .. } => ErrorKind::Input,
            CertVerifyError::EmptyModelReply
            | CertVerifyError::MalformedModelReply { .. }
            | CertVerifyError::ModelTimeout { .. } => ErrorKind::Upstream,
            CertVerifyError::ProviderNotConfigured { .. }
            | CertVerifyError::LlmApiError { .. }
            | CertVerifyError::InvalidConfig(_)
            | CertVerifyError::FileNotFound { .. }
            | CertVerifyError::DownloadFailed { .. }
            | CertVerifyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Caller-safe message. Never contains raw model output or the text of
    /// an underlying library error.
    pub fn public_message(&self) -> &'static str {
        match self {
            CertVerifyError::InvalidRequestBody { .. } => {
                "Request body must be a JSON object with image, filename and mimetype"
            }
            CertVerifyError::InvalidMimeType { .. } => {
                "Invalid mimetype: only image/* uploads are supported"
            }
            CertVerifyError::InvalidImageEncoding { .. } => "Invalid image: not valid base64 data",
            CertVerifyError::EmptyModelReply => "Empty response from the inference model",
            CertVerifyError::MalformedModelReply { .. } => {
                "Malformed response from the inference model"
            }
            CertVerifyError::ModelTimeout { .. } => "The inference model did not respond in time",
            _ => "Internal server error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_400() {
        let e = CertVerifyError::InvalidMimeType {
            mimetype: Some("text/plain".into()),
        };
        assert_eq!(e.kind(), ErrorKind::Input);
        assert_eq!(e.status_code(), 400);

        let e = CertVerifyError::InvalidImageEncoding {
            detail: "bad padding".into(),
        };
        assert_eq!(e.status_code(), 400);
    }

    #[test]
    fn upstream_errors_are_502() {
        assert_eq!(CertVerifyError::EmptyModelReply.status_code(), 502);
        let e = CertVerifyError::MalformedModelReply {
            reason: "expected value".into(),
            raw: "not json at all".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Upstream);
        assert_eq!(e.status_code(), 502);
        assert_eq!(CertVerifyError::ModelTimeout { secs: 30 }.status_code(), 502);
    }

    #[test]
    fn transport_failure_is_internal() {
        let e = CertVerifyError::LlmApiError {
            message: "connection reset".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Internal);
        assert_eq!(e.status_code(), 500);
    }

    #[test]
    fn malformed_reply_keeps_raw_text_out_of_public_message() {
        let e = CertVerifyError::MalformedModelReply {
            reason: "expected value at line 1".into(),
            raw: "SECRET raw reply".into(),
        };
        assert!(e.to_string().contains("SECRET raw reply"));
        assert!(!e.public_message().contains("SECRET"));
    }

    #[test]
    fn internal_public_message_is_generic() {
        let e = CertVerifyError::LlmApiError {
            message: "401 invalid key sk-123".into(),
        };
        assert_eq!(e.public_message(), "Internal server error");
    }
}

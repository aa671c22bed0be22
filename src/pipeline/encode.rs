//! Image encoding: decoded submission bytes → base64 `ImageData`.
//!
//! The validator decodes the client's base64 so malformed input is caught
//! before any network call; VLM APIs want base64 again, so we re-encode the
//! bytes canonically here. The client's original string is never forwarded
//! verbatim.

use crate::pipeline::validate::ImageSubmission;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Wrap a submission as a multimodal image attachment.
///
/// `detail: "high"` lets GPT-4-class models tile the image so small print on
/// the certificate (names, issuer logos) stays legible.
pub fn encode_submission(submission: &ImageSubmission) -> ImageData {
    let b64 = STANDARD.encode(&submission.image_bytes);
    debug!("Encoded image → {} bytes base64", b64.len());

    ImageData::new(b64, submission.mime_type.as_str()).with_detail("high")
}

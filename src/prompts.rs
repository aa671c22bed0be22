//! The instruction sent to the VLM alongside every submitted image.
//!
//! This single prompt is the whole classification policy: the model decides
//! whether the image is a certificate and transcribes the two names. The
//! pipeline only trims whitespace and applies the acceptance rule in
//! [`crate::pipeline::verdict`]; it never edits the extracted text.
//!
//! Callers can override it via [`crate::config::VerifierConfig::instruction`].
//! The reply format described here must stay in sync with
//! [`crate::pipeline::reply`].

/// Default classification-and-extraction instruction.
pub const DEFAULT_INSTRUCTION: &str = r#"You are a document verification assistant. Look at the attached image and decide whether it is a certificate (for example a training, course completion, award, or work experience certificate).

Rules:
1. If the image is a certificate, extract:
   - "company": the organisation that issued the certificate, exactly as printed
   - "candidate": the person the certificate was awarded to, exactly as printed
2. If you are uncertain, the text is unreadable, or the image is not a certificate,
   set "isCertificate" to false and set "company" and "candidate" to null.
3. "confidence" is a number between 0 and 1 expressing how certain you are that
   the image is a certificate.

Respond with a single JSON object with exactly these four keys and no other text:
{"isCertificate": <true|false>, "confidence": <number 0-1>, "company": <string|null>, "candidate": <string|null>}"#;

/// The four keys the model is asked to return.
pub const REPLY_KEYS: [&str; 4] = ["isCertificate", "confidence", "company", "candidate"];

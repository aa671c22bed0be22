//! Pipeline stages for certificate verification.
//!
//! Each submodule implements exactly one step, so each is testable without
//! the others and without a network.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ encode ──▶ llm ──▶ reply ──▶ verdict
//! (mime+b64)   (base64)   (VLM)   (JSON)    (accept?)
//! ```
//!
//! 1. [`validate`] — mime-type prefix and base64 checks; no network
//! 2. [`encode`]   — re-wrap the decoded bytes for the multimodal request
//! 3. [`llm`]      — the single model call; the only stage with network I/O
//! 4. [`reply`]    — strict one-object JSON parse, lenient field coercion
//! 5. [`verdict`]  — confidence floor and field-length acceptance rule

pub mod encode;
pub mod llm;
pub mod reply;
pub mod validate;
pub mod verdict;

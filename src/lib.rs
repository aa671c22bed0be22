//! # edgequake-certverify
//!
//! Decide whether an uploaded image is a certificate and, if it is, who
//! issued it and to whom, using a Vision Language Model (VLM).
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /process-image {image, filename, mimetype}
//!  │
//!  ├─ 1. Validate  mimetype starts with image/, image is base64
//!  ├─ 2. Encode    bytes → base64 ImageData
//!  ├─ 3. VLM       one call, temperature 0, JSON response format
//!  ├─ 4. Parse     exactly one JSON object, lenient field coercion
//!  └─ 5. Accept    isCertificate && confidence ≥ 0.6 && 1..=150 chars
//!                  → {"status":"verified","Company":..,"Candidate":..}
//!                  | {"status":"unverified","reason":..}
//! ```
//!
//! Invalid input is rejected in step 1, before any inference cost is paid.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_certverify::{ImageRequest, Verifier, VerifierConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let verifier = Verifier::from_config(VerifierConfig::default())?;
//!     let request = ImageRequest::new("iVBORw0KGgo=", "cert.png", "image/png");
//!     let verdict = verifier.verify(&request).await?;
//!     println!("{}", serde_json::to_string(&verdict)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `certverify` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod verify;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServerConfig, VerifierConfig, VerifierConfigBuilder};
pub use error::{CertVerifyError, ErrorKind};
pub use pipeline::llm::{GenerationOptions, InferenceModel, ProviderModel};
pub use pipeline::reply::ExtractionResult;
pub use pipeline::validate::{ImageRequest, ImageSubmission};
pub use pipeline::verdict::{Verdict, UNVERIFIED_REASON};
pub use verify::Verifier;

//! End-to-end verification: request in, [`Verdict`] out.
//!
//! [`Verifier`] is built once at startup and shared (behind an `Arc`) by every
//! request. It holds no per-request state, so concurrent calls need no locking.

use crate::config::VerifierConfig;
use crate::error::CertVerifyError;
use crate::pipeline::llm::{invoke_model, GenerationOptions, InferenceModel, ProviderModel};
use crate::pipeline::reply::parse_reply;
use crate::pipeline::validate::{validate_request, ImageRequest, ImageSubmission};
use crate::pipeline::verdict::{decide, AcceptancePolicy, Verdict};
use crate::prompts::DEFAULT_INSTRUCTION;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The verdict pipeline bound to one inference model.
pub struct Verifier {
    model: Arc<dyn InferenceModel>,
    config: VerifierConfig,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("model", &self.model.model_name())
            .field("config", &self.config)
            .finish()
    }
}

impl Verifier {
    /// Resolve the inference model from `config` and build a verifier.
    pub fn from_config(config: VerifierConfig) -> Result<Self, CertVerifyError> {
        let model = resolve_model(&config)?;
        info!("Using inference model: {}", model.model_name());
        Ok(Self { model, config })
    }

    /// Build a verifier around an explicit model, ignoring any provider
    /// settings in `config`.
    pub fn with_model(model: Arc<dyn InferenceModel>, config: VerifierConfig) -> Self {
        Self { model, config }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Validate a raw request and run the pipeline.
    ///
    /// Validation errors return before the model is called.
    pub async fn verify(&self, request: &ImageRequest) -> Result<Verdict, CertVerifyError> {
        let submission = validate_request(request)?;
        self.verify_submission(&submission).await
    }

    /// Run the pipeline on an already-validated submission.
    ///
    /// `Ok(Verdict::Unverified)` is a normal outcome, not a failure.
    pub async fn verify_submission(
        &self,
        submission: &ImageSubmission,
    ) -> Result<Verdict, CertVerifyError> {
        let start = Instant::now();
        let instruction = self
            .config
            .instruction
            .as_deref()
            .unwrap_or(DEFAULT_INSTRUCTION);

        let reply = invoke_model(
            self.model.as_ref(),
            instruction,
            submission,
            &self.generation_options(),
            self.config.model_timeout_secs.map(Duration::from_secs),
        )
        .await?;

        let extraction = parse_reply(&reply)?;
        debug!(
            "'{}': isCertificate={} confidence={:.3}",
            submission.filename, extraction.is_certificate, extraction.confidence
        );

        let verdict = decide(&extraction, &self.acceptance_policy());
        info!(
            "'{}' ({}, {} bytes): {} in {}ms",
            submission.filename,
            submission.mime_type,
            submission.image_bytes.len(),
            if verdict.is_verified() { "verified" } else { "unverified" },
            start.elapsed().as_millis()
        );
        Ok(verdict)
    }

    fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            json_response: true,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    fn acceptance_policy(&self) -> AcceptancePolicy {
        AcceptancePolicy {
            min_confidence: self.config.min_confidence,
            max_field_chars: self.config.max_field_chars,
        }
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, CertVerifyError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        CertVerifyError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the inference model, from most-specific to least-specific.
///
/// 1. **Pre-built model client** (`config.model_client`) — used as-is.
/// 2. **Pre-built provider** (`config.provider`) — wrapped in [`ProviderModel`].
/// 3. **Named provider + model** (`config.provider_name`) — the factory reads
///    the matching API key (`GEMINI_API_KEY`, `OPENAI_API_KEY`, …).
/// 4. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 5. **Gemini** when `GEMINI_API_KEY` is set.
/// 6. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_model(config: &VerifierConfig) -> Result<Arc<dyn InferenceModel>, CertVerifyError> {
    if let Some(ref client) = config.model_client {
        return Ok(Arc::clone(client));
    }

    let model = config.model_id().to_string();

    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderModel::new(Arc::clone(provider), model)));
    }

    if let Some(ref name) = config.provider_name {
        let provider = create_vision_provider(name, &model)?;
        return Ok(Arc::new(ProviderModel::new(provider, model)));
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            let provider = create_vision_provider(&prov, &env_model)?;
            return Ok(Arc::new(ProviderModel::new(provider, env_model)));
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let provider = create_vision_provider("gemini", &model)?;
            return Ok(Arc::new(ProviderModel::new(provider, model)));
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| CertVerifyError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    let name = llm_provider.model().to_string();
    Ok(Arc::new(ProviderModel::new(llm_provider, name)))
}

//! Configuration types for certificate verification.
//!
//! Verification behaviour is controlled through [`VerifierConfig`], built via
//! its [`VerifierConfigBuilder`]. The HTTP listener is configured separately
//! by [`ServerConfig`] so the library can be embedded without a server.

use crate::error::CertVerifyError;
use crate::pipeline::llm::InferenceModel;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the verdict pipeline.
///
/// # Example
/// ```rust
/// use edgequake_certverify::VerifierConfig;
///
/// let config = VerifierConfig::builder()
///     .provider_name("gemini")
///     .model("gemini-2.0-flash")
///     .model_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_confidence, 0.6);
/// ```
#[derive(Clone)]
pub struct VerifierConfig {
    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, the provider is resolved from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed inference capability. Takes precedence over everything
    /// else; lets callers plug in a non-edgequake backend or a test double.
    pub model_client: Option<Arc<dyn InferenceModel>>,

    /// Sampling temperature. Default: 0.0 (most deterministic).
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    ///
    /// The reply is a four-key JSON object; this only has to leave room for
    /// unusually long organisation names.
    pub max_tokens: usize,

    /// Minimum model-reported confidence for a verified verdict. Default: 0.6.
    pub min_confidence: f64,

    /// Maximum length, in characters after trimming, of `company` and
    /// `candidate` in a verified verdict. Default: 150.
    pub max_field_chars: usize,

    /// Custom instruction. If None, uses [`crate::prompts::DEFAULT_INSTRUCTION`].
    pub instruction: Option<String>,

    /// Per-call model timeout in seconds. Default: None (wait indefinitely).
    ///
    /// A timed-out call is reported as [`CertVerifyError::ModelTimeout`].
    pub model_timeout_secs: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            model_client: None,
            temperature: 0.0,
            max_tokens: 1024,
            min_confidence: 0.6,
            max_field_chars: 150,
            instruction: None,
            model_timeout_secs: None,
        }
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field(
                "model_client",
                &self.model_client.as_ref().map(|_| "<dyn InferenceModel>"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("min_confidence", &self.min_confidence)
            .field("max_field_chars", &self.max_field_chars)
            .field("instruction", &self.instruction.as_ref().map(|s| s.len()))
            .field("model_timeout_secs", &self.model_timeout_secs)
            .finish()
    }
}

impl VerifierConfig {
    /// Create a new builder for `VerifierConfig`.
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model id that will be requested.
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`VerifierConfig`].
#[derive(Debug)]
pub struct VerifierConfigBuilder {
    config: VerifierConfig,
}

impl VerifierConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn model_client(mut self, client: Arc<dyn InferenceModel>) -> Self {
        self.config.model_client = Some(client);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn min_confidence(mut self, c: f64) -> Self {
        self.config.min_confidence = c;
        self
    }

    pub fn max_field_chars(mut self, n: usize) -> Self {
        self.config.max_field_chars = n;
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = Some(instruction.into());
        self
    }

    pub fn model_timeout_secs(mut self, secs: u64) -> Self {
        self.config.model_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<VerifierConfig, CertVerifyError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.min_confidence) {
            return Err(CertVerifyError::InvalidConfig(format!(
                "min_confidence must be 0–1, got {}",
                c.min_confidence
            )));
        }
        if c.max_field_chars == 0 {
            return Err(CertVerifyError::InvalidConfig(
                "max_field_chars must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(CertVerifyError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.model_timeout_secs == Some(0) {
            return Err(CertVerifyError::InvalidConfig(
                "model timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Listener settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address. Default: "0.0.0.0".
    pub host: String,

    /// Listening port. Default: 5000.
    pub port: u16,

    /// Maximum accepted request body in bytes. Default: 32 MiB.
    ///
    /// Base64 inflates an image by a third, so axum's 2 MB default rejects
    /// ordinary phone photos of certificates.
    pub body_limit_bytes: usize,

    /// Allow any origin, method and header. Default: true.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 32 * 1024 * 1024,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

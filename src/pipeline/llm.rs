//! VLM interaction: send the instruction and image, get the reply text.
//!
//! The pipeline depends on the [`InferenceModel`] capability rather than on a
//! concrete provider. [`ProviderModel`] adapts any edgequake-llm
//! [`LLMProvider`] to it; tests substitute a scripted double.
//!
//! Exactly one call is made per submission. There is no retry: a failed call
//! surfaces as an error and the caller decides whether to resubmit. An
//! optional timeout turns a hanging call into [`CertVerifyError::ModelTimeout`].

use crate::error::CertVerifyError;
use crate::pipeline::encode::encode_submission;
use crate::pipeline::validate::ImageSubmission;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Generation parameters passed with every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Ask the provider to constrain output to a JSON object.
    pub json_response: bool,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            json_response: true,
            temperature: 0.0,
            max_tokens: 1024,
        }
    }
}

/// `generateContent(instruction, image, options) -> reply text`.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Send `instruction` and the submitted image as one multimodal request.
    ///
    /// Returns the model's text content, which may be empty.
    async fn generate_content(
        &self,
        instruction: &str,
        image: &ImageSubmission,
        options: &GenerationOptions,
    ) -> Result<String, CertVerifyError>;

    /// Human-readable model name for logs and health checks.
    fn model_name(&self) -> &str;
}

/// [`InferenceModel`] backed by an edgequake-llm provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl InferenceModel for ProviderModel {
    async fn generate_content(
        &self,
        instruction: &str,
        image: &ImageSubmission,
        options: &GenerationOptions,
    ) -> Result<String, CertVerifyError> {
        // Instruction and image travel in the same user turn.
        let messages = vec![ChatMessage::user_with_images(
            instruction,
            vec![encode_submission(image)],
        )];
        let completion = build_options(options);

        let response = self
            .provider
            .chat(&messages, Some(&completion))
            .await
            .map_err(|e| CertVerifyError::LlmApiError {
                message: e.to_string(),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.model, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Build `CompletionOptions` from the generation options.
fn build_options(options: &GenerationOptions) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(options.temperature),
        max_tokens: Some(options.max_tokens),
        response_format: options
            .json_response
            .then(|| "json_object".to_string()),
        ..Default::default()
    }
}

/// Call the model once and return its non-empty reply text.
///
/// ## Errors
/// - [`CertVerifyError::ModelTimeout`] when `timeout` elapses first
/// - [`CertVerifyError::EmptyModelReply`] when the reply has no text
/// - whatever the model itself returns (typically `LlmApiError`)
pub async fn invoke_model(
    model: &dyn InferenceModel,
    instruction: &str,
    submission: &ImageSubmission,
    options: &GenerationOptions,
    timeout: Option<Duration>,
) -> Result<String, CertVerifyError> {
    let start = Instant::now();
    let call = model.generate_content(instruction, submission, options);

    let reply = match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            warn!(
                "{}: no reply after {}s for '{}'",
                model.model_name(),
                limit.as_secs(),
                submission.filename
            );
            CertVerifyError::ModelTimeout {
                secs: limit.as_secs(),
            }
        })??,
        None => call.await?,
    };

    debug!(
        "{}: reply of {} chars in {:?}",
        model.model_name(),
        reply.len(),
        start.elapsed()
    );

    if reply.trim().is_empty() {
        return Err(CertVerifyError::EmptyModelReply);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl InferenceModel for Fixed {
        async fn generate_content(
            &self,
            _instruction: &str,
            _image: &ImageSubmission,
            _options: &GenerationOptions,
        ) -> Result<String, CertVerifyError> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct Hangs;

    #[async_trait]
    impl InferenceModel for Hangs {
        async fn generate_content(
            &self,
            _instruction: &str,
            _image: &ImageSubmission,
            _options: &GenerationOptions,
        ) -> Result<String, CertVerifyError> {
            std::future::pending::<()>().await;
            unreachable!()
        }

        fn model_name(&self) -> &str {
            "hangs"
        }
    }

    fn submission() -> ImageSubmission {
        ImageSubmission {
            image_bytes: vec![1, 2, 3],
            mime_type: "image/png".into(),
            filename: "a.png".into(),
        }
    }

    #[test]
    fn build_options_requests_deterministic_json() {
        let opts = build_options(&GenerationOptions::default());
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(1024));
        assert_eq!(opts.response_format.as_deref(), Some("json_object"));
    }

    #[tokio::test]
    async fn empty_reply_is_an_upstream_error() {
        for reply in ["", "  \n\t"] {
            let err = invoke_model(
                &Fixed(reply),
                "x",
                &submission(),
                &GenerationOptions::default(),
                None,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, CertVerifyError::EmptyModelReply));
        }
    }

    #[tokio::test]
    async fn non_empty_reply_is_returned_verbatim() {
        let reply = invoke_model(
            &Fixed(" {\"a\":1} "),
            "x",
            &submission(),
            &GenerationOptions::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, " {\"a\":1} ");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_classified_as_upstream() {
        let err = invoke_model(
            &Hangs,
            "x",
            &submission(),
            &GenerationOptions::default(),
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CertVerifyError::ModelTimeout { secs: 5 }));
    }
}
